// Tests for metadata rendering
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
use crate::xml::Document;
use serde_json::json;

const XML: &str = r#"<faust>
  <name>tone</name>
  <author>Jane Doe</author>
  <classname>mydsp</classname>
  <inputs>0</inputs>
  <outputs>1</outputs>
  <meta key="version">2</meta>
  <meta key="ratio">0.25</meta>
  <meta key="tone.dsp/process:output0">Out [kind:mono]</meta>
  <ui>
    <activewidgets>
      <widget type="hslider" id="1">
        <label>Cutoff</label>
        <varname>fHslider0</varname>
        <init>1000</init><min>20</min><max>20000</max><step>1</step>
        <meta key="unit">Hz</meta>
        <meta key="scale">log</meta>
      </widget>
    </activewidgets>
    <passivewidgets>
      <widget type="hbargraph" id="2">
        <label>Level</label>
        <varname>fHbargraph0</varname>
        <min>-60</min><max>0</max>
      </widget>
    </passivewidgets>
  </ui>
</faust>"#;

fn metadata() -> Metadata {
    Metadata::extract(&Document::parse(XML).unwrap(), "")
        .unwrap()
        .with_origin("tone.dsp", "process")
}

fn context() -> Context {
    Context::new(&metadata(), Vec::<(String, String)>::new())
}

#[test]
fn flattens_scalars() {
    let ctx = context();

    assert_eq!(ctx.get("name"), Some(&json!("tone")));
    assert_eq!(ctx.get("author"), Some(&json!("Jane Doe")));
    assert_eq!(ctx.get("copyright"), Some(&json!("")));
    assert_eq!(ctx.get("class_name"), Some(&json!("mydsp")));
    assert_eq!(ctx.get("file_name"), Some(&json!("tone.dsp")));
    assert_eq!(ctx.get("process_name"), Some(&json!("process")));
    assert_eq!(ctx.get("inputs"), Some(&json!(0)));
    assert_eq!(ctx.get("outputs"), Some(&json!(1)));
    assert!(ctx.get("class_code").map_or(false, Value::is_string));
}

#[test]
fn meta_values_are_interpreted() {
    let ctx = context();

    assert_eq!(
        ctx.get("meta"),
        Some(&json!({
            "version": 2,
            "ratio": 0.25,
            "tone.dsp/process:output0": "Out [kind:mono]",
        }))
    );
}

#[test]
fn flattens_widgets() {
    let ctx = context();

    assert_eq!(
        ctx.get("active"),
        Some(&json!([{
            "type": "hslider",
            "id": 1,
            "label": "Cutoff",
            "var": "fHslider0",
            "init": 1000.0,
            "min": 20.0,
            "max": 20000.0,
            "step": 1.0,
            "unit": "Hz",
            "scale": "log",
            "tooltip": "",
            "meta": { "unit": "Hz", "scale": "log" },
        }]))
    );

    assert_eq!(
        ctx.get("passive"),
        Some(&json!([{
            "type": "hbargraph",
            "id": 2,
            "label": "Level",
            "var": "fHbargraph0",
            "init": 0.0,
            "min": -60.0,
            "max": 0.0,
            "step": 0.0,
            "unit": "",
            "scale": "",
            "tooltip": "",
            "meta": {},
        }]))
    );
}

#[test]
fn flattens_ports() {
    let ctx = context();

    assert_eq!(ctx.get("ins"), Some(&json!([])));
    assert_eq!(
        ctx.get("outs"),
        Some(&json!([{ "name": "Out", "meta": { "kind": "mono" } }]))
    );
}

#[test]
fn defines_are_layered_on_top() {
    let ctx = Context::new(
        &metadata(),
        [
            ("name", "override"),
            ("rate", "48000"),
            ("gain", "-1.5"),
            ("mode", "fast"),
            ("rate", "44100"),
        ],
    );

    assert_eq!(ctx.get("name"), Some(&json!("override")));
    assert_eq!(ctx.get("rate"), Some(&json!(44100)));
    assert_eq!(ctx.get("gain"), Some(&json!(-1.5)));
    assert_eq!(ctx.get("mode"), Some(&json!("fast")));
}

#[test]
fn value_strings() {
    assert_eq!(parse_value_string("-3"), json!(-3));
    assert_eq!(parse_value_string(" 7 "), json!(7));
    assert_eq!(parse_value_string("1e3"), json!(1000.0));
    assert_eq!(parse_value_string(""), json!(""));
    assert_eq!(parse_value_string("1.5f"), json!("1.5f"));
    assert_eq!(parse_value_string("inf"), json!("inf"));
}

#[test]
fn non_finite_numbers_become_strings() {
    assert_eq!(number(f64::NAN), json!("NaN"));
    assert_eq!(number(2.5), json!(2.5));
}

#[test]
fn callables() {
    assert_eq!(Callable::CStr.call(&[json!("a\"b")]).ok(), Some(json!(r#""a\"b""#)));
    assert_eq!(Callable::CId.call(&[json!("3 dB")]).ok(), Some(json!("_3_dB")));
    assert_eq!(Callable::CId.call(&[]).ok(), Some(json!("_")));
    assert_eq!(Callable::CStr.call(&[json!(12)]).ok(), Some(json!(r#""12""#)));
}

#[test]
fn fail_aborts_with_message() {
    assert!(matches!(
        Callable::Fail.call(&[json!("bad config")]),
        Err(RenderError::Failure(msg)) if msg == "bad config"
    ));
    assert!(matches!(
        Callable::Fail.call(&[]),
        Err(RenderError::Failure(msg)) if msg == DEFAULT_FAILURE_MESSAGE
    ));
}

#[test]
fn callable_names() {
    let names: Vec<_> = Callable::ALL.into_iter().map(Callable::name).collect();

    assert_eq!(names, ["cstr", "cid", "fail"]);
    assert_eq!(Callable::CId.to_string(), "cid");
}

fn render_template(files: &[(&str, &str)], ctx: &Context) -> Result<String, RenderError> {
    let dir = tempfile::tempdir().unwrap();

    for (name, text) in files {
        std::fs::write(dir.path().join(name), text).unwrap();
    }

    let mut out = Vec::new();
    TemplateRenderer::new(dir.path().join(files[0].0)).render(ctx, &mut out)?;

    Ok(String::from_utf8(out).unwrap())
}

#[test]
fn template_sees_context_values() {
    let tmpl = "{{ class_name }} {{ outs[0].name }}\n\
                {% for w in active %}{{ w.var }}={{ w.init }} {{ w.unit }}{% endfor %}\n";

    assert_eq!(
        render_template(&[("out.tmpl", tmpl)], &context()).unwrap(),
        "mydsp Out\nfHslider0=1000.0 Hz"
    );
}

#[test]
fn template_calls_functions() {
    let tmpl = r#"{{ cstr(name ~ " \"x\"") }} {{ cid(outs[0].meta.kind ~ " 2") }}"#;

    assert_eq!(
        render_template(&[("out.tmpl", tmpl)], &context()).unwrap(),
        r#""tone \"x\"" mono_2"#
    );
}

#[test]
fn template_fail_aborts_rendering() {
    let ctx = context();

    assert!(matches!(
        render_template(&[("out.tmpl", "before {{ fail(\"no outputs\") }}")], &ctx),
        Err(RenderError::Failure(msg)) if msg == "no outputs"
    ));
    assert!(matches!(
        render_template(&[("out.tmpl", "{{ fail() }}")], &ctx),
        Err(RenderError::Failure(msg)) if msg == DEFAULT_FAILURE_MESSAGE
    ));
}

#[test]
fn template_includes_from_its_directory() {
    let files = [
        ("main.tmpl", "[{% include \"part.tmpl\" %}]"),
        ("part.tmpl", "{{ name }}"),
    ];

    assert_eq!(render_template(&files, &context()).unwrap(), "[tone]");
}

#[test]
fn missing_template_is_an_error() {
    let mut out = Vec::new();

    assert!(matches!(
        TemplateRenderer::new("/nonexistent/faustpp/out.tmpl").render(&context(), &mut out),
        Err(RenderError::Template(_))
    ));
    assert!(matches!(
        TemplateRenderer::new("/").render(&context(), &mut out),
        Err(RenderError::InvalidTemplatePath(_))
    ));
}

#[test]
fn json_renderer_writes_object() {
    let ctx = context();
    let mut out = Vec::new();

    JsonRenderer.render(&ctx, &mut out).unwrap();

    assert_eq!(out.last(), Some(&b'\n'));

    let parsed: Value = serde_json::from_slice(&out).unwrap();
    assert_eq!(parsed, Value::Object(ctx.values().clone()));
}
