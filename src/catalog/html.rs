// src/catalog/html.rs

//! `index.html` rendering

use super::{Catalog, Library};
use std::collections::BTreeMap;
use std::fmt::Write;

const DOC_SITE: &str = "http://www.boost.org/";

const PAGE_HEADER: &str = r#"<!DOCTYPE HTML>
<html>

<head>

<title>Installed Boost C++ Libraries</title>
<meta http-equiv="Content-Type" content="text/html; charset=utf-8" />

<style type="text/css">

A { color: #06C; text-decoration: none; }
A:hover { text-decoration: underline; }

.main { margin-left: 4em; margin-right: 4em; color: #4A6484; }

.logo { font-family: sans-serif; font-style: italic; }
.logo .upper { font-size: 48pt; font-weight: 800; }
.logo .lower { font-size: 17pt; }

.header { margin-top: 2em; }
.section { margin-top: 2em; }

.category-container { margin-left: 1em; padding-left: 1em; border-left: 1px dotted; }

dt { float: left; clear: left; width: 6em; }
dd { margin-left: 7em; }

#alphabetically p { margin-left: 2em; }
#alphabetically dl { margin-left: 2em; }

</style>

</head>

<body>
<div class="main">

<div class="logo">
<div class="upper">boost</div>
<div class="lower">C++ LIBRARIES</div>
</div>

"#;

const PAGE_FOOTER: &str = "</div>\n</body>\n</html>\n";

const CATEGORY_TITLES: &[(&str, &str)] = &[
    ("String", "String and Text Processing"),
    ("Function-objects", "Function Objects and Higher-Order Programming"),
    ("Generic", "Generic Programming"),
    ("Metaprogramming", "Template Metaprogramming"),
    ("Preprocessor", "Preprocessor Metaprogramming"),
    ("Concurrent", "Concurrent Programming"),
    ("Math", "Math and Numerics"),
    ("Correctness", "Correctness and Testing"),
    ("Data", "Data Structures"),
    ("Domain", "Domain Specific"),
    ("Image-processing", "Image Processing"),
    ("IO", "Input/Output"),
    ("Inter-language", "Inter-Language Support"),
    ("Emulation", "Emulation of Language Features"),
    ("Patterns", "Patterns and Idioms"),
    ("Programming", "Programming Interfaces"),
    ("State", "State Machines"),
    ("workarounds", "Broken Compiler Workarounds"),
];

/// Display title of a category id; unknown ids are shown as-is
pub fn category_title(id: &str) -> &str {
    CATEGORY_TITLES
        .iter()
        .find(|(known, _)| *known == id)
        .map_or(id, |&(_, title)| title)
}

/// Category title to (id, library keys), ordered by title
type Sections<'a> = BTreeMap<&'a str, (&'a str, &'a [String])>;

/// Render the whole catalog page
pub fn render(catalog: &Catalog) -> String {
    let sections: Sections<'_> = catalog
        .categories
        .iter()
        .map(|(id, keys)| (category_title(id), (id.as_str(), keys.as_slice())))
        .collect();

    let mut page = String::from(PAGE_HEADER);

    // Writing into a String cannot fail
    let _ = write_links(&mut page, &sections);
    let _ = write_alphabetical(&mut page, catalog);
    let _ = write_by_category(&mut page, catalog, &sections);

    page.push_str(PAGE_FOOTER);
    page
}

fn write_links(out: &mut String, sections: &Sections<'_>) -> std::fmt::Result {
    out.push_str(
        "<div class=\"header\">\n\
         <div><a href=\"#alphabetically\">Libraries Listed Alphabetically</a></div>\n\
         <div><a href=\"#by_category\">Libraries Listed by Category</a></div>\n\
         <div>&nbsp;</div>\n",
    );

    for (title, (id, _)) in sections {
        writeln!(
            out,
            "<div><a href=\"#cat:{}\">{}</a></div>",
            escape(id),
            escape(title)
        )?;
    }

    out.push_str("</div>\n\n");
    Ok(())
}

/// Libraries sorted by name; nameless libraries are left out
fn write_alphabetical(out: &mut String, catalog: &Catalog) -> std::fmt::Result {
    out.push_str(
        "<div class=\"section\" id=\"alphabetically\">\n\n\
         <h2>Libraries Listed Alphabetically</h2>\n\n",
    );

    let by_name: BTreeMap<&str, &Library> = catalog
        .libraries
        .values()
        .filter(|lib| !lib.name.is_empty())
        .map(|lib| (lib.name.as_str(), lib))
        .collect();

    for library in by_name.values() {
        write_title(out, library)?;

        out.push_str("<dl>\n");

        if !library.authors.is_empty() {
            writeln!(
                out,
                "<dt>Author(s):</dt><dd>{}</dd>",
                escape(&library.authors.join(", "))
            )?;
        }

        if !library.categories.is_empty() {
            let links: Vec<String> = library
                .categories
                .iter()
                .map(|id| {
                    format!(
                        "<a href=\"#cat:{}\">{}</a>",
                        escape(id),
                        escape(category_title(id))
                    )
                })
                .collect();
            writeln!(out, "<dt>Category:</dt><dd>{}</dd>", links.join(" &bull; "))?;
        }

        out.push_str("</dl>\n\n");
    }

    out.push_str("</div>\n\n");
    Ok(())
}

fn write_by_category(out: &mut String, catalog: &Catalog, sections: &Sections<'_>) -> std::fmt::Result {
    out.push_str(
        "<div class=\"section\" id=\"by_category\">\n\n\
         <h2>Libraries Listed by Category</h2>\n\n",
    );

    for (title, (id, keys)) in sections {
        write!(
            out,
            "<h3 class=\"category\" id=\"cat:{}\">{}</h3>\n\n\
             <div class=\"category-container\">\n\n",
            escape(id),
            escape(title)
        )?;

        for library in keys.iter().filter_map(|key| catalog.libraries.get(key)) {
            write_title(out, library)?;
        }

        out.push_str("</div>\n\n");
    }

    out.push_str("</div>\n\n");
    Ok(())
}

/// Linked name and description paragraph
fn write_title(out: &mut String, library: &Library) -> std::fmt::Result {
    write!(
        out,
        "<h4><a href=\"{}{}/{}\">{}</a></h4>\n\n\
         <p class=\"description\">{}</p>\n\n",
        DOC_SITE,
        escape(&library.path),
        escape(&library.documentation),
        escape(&library.name),
        escape(&library.description)
    )
}

fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    fn library(key: &str, name: &str, categories: &[&str]) -> Library {
        Library {
            key: key.to_string(),
            name: name.to_string(),
            path: format!("libs/{key}"),
            documentation: "index.html".to_string(),
            categories: categories.iter().map(|c| c.to_string()).collect(),
            ..Default::default()
        }
    }

    fn catalog(libraries: Vec<Library>) -> Catalog {
        let mut catalog = Catalog::default();
        for lib in libraries {
            for category in &lib.categories {
                catalog
                    .categories
                    .entry(category.clone())
                    .or_default()
                    .push(lib.key.clone());
            }
            catalog.libraries.insert(lib.key.clone(), lib);
        }
        catalog
    }

    #[test]
    fn test_category_title() {
        assert_eq!(category_title("IO"), "Input/Output");
        assert_eq!(category_title("workarounds"), "Broken Compiler Workarounds");
        assert_eq!(category_title("Misc"), "Misc");
    }

    #[test]
    fn test_alphabetical_order_by_name() {
        let page = render(&catalog(vec![
            library("zeta", "Alpha", &[]),
            library("alpha", "Zeta", &[]),
        ]));

        let first = page.find(">Alpha</a>").unwrap();
        let second = page.find(">Zeta</a>").unwrap();
        assert!(first < second);
    }

    #[test]
    fn test_categories_ordered_by_title() {
        // "Input/Output" sorts before "String and Text Processing"
        let page = render(&catalog(vec![library("a", "A", &["String", "IO"])]));

        let io = page.find("id=\"cat:IO\"").unwrap();
        let string = page.find("id=\"cat:String\"").unwrap();
        assert!(io < string);
        assert!(page.contains("<a href=\"#cat:String\">String and Text Processing</a> &bull; "));
    }

    #[test]
    fn test_nameless_library_only_in_categories() {
        let page = render(&catalog(vec![library("x", "", &["Data"])]));
        let alpha = page.find("id=\"alphabetically\"").unwrap();
        let by_cat = page.find("id=\"by_category\"").unwrap();
        let link = page.find("libs/x/index.html").unwrap();
        assert!(link > by_cat);
        assert!(alpha < by_cat);
    }

    #[test]
    fn test_text_is_escaped() {
        let mut lib = library("x", "X<T>", &[]);
        lib.description = "a & b".to_string();
        let page = render(&catalog(vec![lib]));
        assert!(page.contains("X&lt;T&gt;"));
        assert!(page.contains("a &amp; b"));
        assert!(page.ends_with("</html>\n"));
    }
}
