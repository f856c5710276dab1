// Tests for the XML document tree
//
//  Copyright (C) 2026 The faustpp contributors
//
//  This file is part of faustpp.
//
//  This program is free software: you can redistribute it and/or modify
//  it under the terms of the GNU General Public License as published by
//  the Free Software Foundation, either version 3 of the License, or
//  (at your option) any later version.
//
//  This program is distributed in the hope that it will be useful,
//  but WITHOUT ANY WARRANTY; without even the implied warranty of
//  MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
//  GNU General Public License for more details.
//
//  You should have received a copy of the GNU General Public License
//  along with this program.  If not, see <http://www.gnu.org/licenses/>.

use super::*;

const DOC: &str = r#"<?xml version="1.0"?>
<faust>
  <name>Tone &amp; Volume</name>
  <author></author>
  <meta key="author">someone</meta>
  <ui>
    <activewidgets>
      <count>2</count>
      <widget type="hslider" id="1"><label>gain</label></widget>
      <widget type="button" id="2"><label><![CDATA[<go>]]></label></widget>
    </activewidgets>
    <passivewidgets>
      <count>0</count>
    </passivewidgets>
  </ui>
</faust>
"#;

fn doc() -> Document {
    Document::parse(DOC).unwrap()
}

#[test]
fn reads_root_and_children() {
    let doc = doc();
    let root = doc.root();

    assert_eq!(root.name(), "faust");
    assert_eq!(
        root.children().map(Element::name).collect::<Vec<_>>(),
        vec!["name", "author", "meta", "ui"],
    );
}

#[test]
fn text_is_unescaped() {
    assert_eq!(
        doc().root().child_text("name"),
        Some("Tone & Volume".into())
    );
}

#[test]
fn empty_and_missing_child_text() {
    let doc = doc();

    assert_eq!(doc.root().child_text("author"), None);
    assert_eq!(doc.root().child_text("license"), None);
    assert_eq!(doc.root().child("author").map(Element::text), Some("".into()));
}

#[test]
fn child_outlives_name() {
    let doc = doc();

    let meta = {
        let name = String::from("meta");
        doc.root().child(&name)
    };

    assert_eq!(meta.and_then(|ele| ele.attr("key")), Some("author"));
}

#[test]
fn reads_attributes() {
    let doc = doc();
    let meta = doc.root().child("meta").unwrap();

    assert_eq!(meta.attr("key"), Some("author"));
    assert_eq!(meta.attr("missing"), None);
    assert_eq!(meta.text(), "someone");
}

#[test]
fn cdata_is_text() {
    let doc = doc();
    let widgets = doc.root().select("ui/activewidgets/widget");

    assert_eq!(widgets[1].child_text("label"), Some("<go>".into()));
}

#[test]
fn select_follows_path_in_document_order() {
    let doc = doc();

    let ids = doc
        .root()
        .select("./ui/activewidgets/widget")
        .into_iter()
        .map(|w| w.attr("id").unwrap())
        .collect::<Vec<_>>();

    assert_eq!(ids, vec!["1", "2"]);
    assert!(doc.root().select("ui/passivewidgets/widget").is_empty());
    assert!(doc.root().select("nope/widget").is_empty());
}

#[test]
fn apply_appends_to_root_and_nested_elements() {
    let doc = doc();

    let (path, _) = doc
        .select_indexed("ui/activewidgets/widget")
        .into_iter()
        .find(|(_, w)| w.attr("id") == Some("2"))
        .unwrap();

    let mut diff = Diff::default();
    diff.append(NodePath::default(), Element::new("meta").with_text("a"));
    diff.append(path.clone(), Element::new("meta").with_text("b"));
    diff.append(NodePath::default(), Element::new("meta").with_text("c"));
    assert_eq!(diff.len(), 3);

    let patched = doc.apply(diff);

    let root_meta = patched
        .root()
        .children_named("meta")
        .map(Element::text)
        .collect::<Vec<_>>();
    assert_eq!(root_meta, vec!["someone", "a", "c"]);

    let widget = patched.root().select("ui/activewidgets/widget")[1];
    assert_eq!(
        widget.children().map(Element::name).collect::<Vec<_>>(),
        vec!["label", "meta"],
    );
    assert_eq!(widget.child_text("meta"), Some("b".into()));
}

#[test]
fn apply_empty_diff_is_identity() {
    assert_eq!(doc().apply(Diff::default()), doc());
}

#[test]
fn with_attr_replaces_existing() {
    let ele = Element::new("meta").with_attr("key", "a").with_attr("key", "b");

    assert_eq!(ele.attr("key"), Some("b"));
}

#[test]
fn root_path() {
    assert!(NodePath::default().is_root());
    assert!(!doc().select_indexed("ui")[0].0.is_root());
}

#[test]
fn rejects_empty_document() {
    assert_eq!(Document::parse(""), Err(Error::NoRoot));
    assert_eq!(Document::parse("<?xml version=\"1.0\"?>\n"), Err(Error::NoRoot));
}

#[test]
fn rejects_unclosed_element() {
    // Depending on the reader,
    //   this is detected either by quick-xml or by the tree builder.
    assert!(matches!(
        Document::parse("<faust><name>x</name>"),
        Err(Error::Unclosed(_) | Error::Xml(_))
    ));
}

#[test]
fn rejects_second_root() {
    assert_eq!(
        Document::parse("<a/><b/>"),
        Err(Error::ExtraRoot("b".into()))
    );
}

#[test]
fn rejects_mismatched_end() {
    assert!(matches!(
        Document::parse("<a><b></a>"),
        Err(Error::Xml(_))
    ));
}
