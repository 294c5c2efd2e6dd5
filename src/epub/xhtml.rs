//! XHTML templates and the default stylesheet.

use quick_xml::escape::escape;

use crate::element::Attributes;

pub(crate) const DEFAULT_STYLE: &str = r#"body {
  margin: 5%;
  text-align: justify;
}
p {
  text-indent: 1.5em;
  margin: 0;
}
.bookweave-tp {
  margin-top: 20%;
  text-align: center;
}
.bookweave-tp-authors {
  font-size: 1.2em;
}
.bookweave-tp-title {
  font-size: 1.8em;
  font-weight: bold;
  margin: 1em 0;
}
.bookweave-tp-sub {
  font-size: 1.1em;
  font-weight: normal;
  margin-top: 0.5em;
}
.bookweave-chapter-h {
  text-align: center;
  margin: 2em 0 1em 0;
}
.bookweave-small-h {
  font-size: 0.7em;
  font-weight: normal;
  margin-bottom: 0.5em;
}
.bookweave-false-h {
  text-indent: 0;
  text-align: center;
  font-weight: bold;
  margin: 1em 0;
}
"#;

/// Wrap body markup into a complete XHTML 1.1 document.
pub(crate) fn document(title: &str, body: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<!DOCTYPE html PUBLIC "-//W3C//DTD XHTML 1.1//EN" "http://www.w3.org/TR/xhtml11/DTD/xhtml11.dtd">
<html xmlns="http://www.w3.org/1999/xhtml">
<head>
<meta http-equiv="Content-Type" content="application/xhtml+xml; charset=utf-8" />
<title>{}</title>
<link rel="stylesheet" type="text/css" href="style.css" />
</head>
<body>
{}</body>
</html>
"#,
        escape(title),
        body
    )
}

/// Render `<tag a="v" ...>`.
pub(crate) fn start_tag(tag: &str, attrs: &Attributes) -> String {
    let mut out = format!("<{tag}");
    for (name, value) in attrs.iter() {
        out.push_str(&format!(" {name}=\"{}\"", escape(value)));
    }
    out.push('>');
    out
}

/// "A", "A and B", "A, B, and C".
pub(crate) fn join_names<'a>(names: impl IntoIterator<Item = &'a str>) -> String {
    let names: Vec<&str> = names.into_iter().collect();
    match names.as_slice() {
        [] => String::new(),
        [one] => one.to_string(),
        [first, second] => format!("{first} and {second}"),
        [init @ .., last] => format!("{}, and {last}", init.join(", ")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_start_tag_escapes_values() {
        let attrs: Attributes = [("class", "x"), ("title", "a \"b\" & c")].into_iter().collect();
        assert_eq!(
            start_tag("p", &attrs),
            r#"<p class="x" title="a &quot;b&quot; &amp; c">"#
        );
        assert_eq!(start_tag("div", &Attributes::new()), "<div>");
    }

    #[test]
    fn test_join_names() {
        assert_eq!(join_names(Vec::<&str>::new()), "");
        assert_eq!(join_names(["Kafka"]), "Kafka");
        assert_eq!(join_names(["Kafka", "Brod"]), "Kafka and Brod");
        assert_eq!(join_names(["A", "B", "C"]), "A, B, and C");
    }

    #[test]
    fn test_document_escapes_title() {
        let doc = document("Q & A", "<p>x</p>\n");
        assert!(doc.contains("<title>Q &amp; A</title>"));
        assert!(doc.contains("<body>\n<p>x</p>\n</body>"));
    }
}
