//! End-to-end rendering tests for the template dialect

use livepatch_template::{Renderer, Template, TemplateError, TemplateRenderer};
use proptest::prelude::*;
use serde_json::{json, Value};
use test_case::test_case;

fn render(source: &str, data: Value) -> Result<String, TemplateError> {
    let template = Template::parse("test", source)?;
    TemplateRenderer::new().render(&template, &data)
}

#[test_case("<p>{{.Name}}</p>", json!({"Name": "Ada"}), "<p>Ada</p>" ; "field")]
#[test_case("<p>{{.User.Name}}</p>", json!({"User": {"Name": "Ada"}}), "<p>Ada</p>" ; "nested field")]
#[test_case("<p>{{.Count}}</p>", json!({"Count": 3}), "<p>3</p>" ; "number")]
#[test_case("<p>{{.Missing}}x</p>", json!({"Missing": null}), "<p>x</p>" ; "null prints nothing")]
#[test_case("<p>{{.Html}}</p>", json!({"Html": "<b>"}), "<p>&lt;b&gt;</p>" ; "escaped")]
#[test_case("{{if .On}}on{{else}}off{{end}}", json!({"On": true}), "on" ; "if true")]
#[test_case("{{if .On}}on{{else}}off{{end}}", json!({"On": false}), "off" ; "if false")]
#[test_case("{{if .On}}on{{else}}off{{end}}", json!({}), "off" ; "if missing")]
#[test_case("{{if not .On}}off{{end}}", json!({"On": false}), "off" ; "not")]
#[test_case("{{if .A}}a{{else if .B}}b{{else}}c{{end}}", json!({"B": 1}), "b" ; "else if")]
#[test_case("<ul>{{range .Items}}<li>{{.}}</li>{{end}}</ul>", json!({"Items": ["a", "b"]}), "<ul><li>a</li><li>b</li></ul>" ; "range")]
#[test_case("<ul>{{range .Items}}<li>{{.}}</li>{{else}}<li>none</li>{{end}}</ul>", json!({"Items": []}), "<ul><li>none</li></ul>" ; "range else")]
#[test_case("{{range .Rows}}{{.Name}}@{{$.Site}} {{end}}", json!({"Site": "s", "Rows": [{"Name": "a"}, {"Name": "b"}]}), "a@s b@s " ; "root inside range")]
#[test_case("{{with .User}}{{.Name}}{{else}}guest{{end}}", json!({"User": {"Name": "Ada"}}), "Ada" ; "with")]
#[test_case("{{with .User}}{{.Name}}{{else}}guest{{end}}", json!({"User": null}), "guest" ; "with else")]
#[test_case("a{{/* hidden */}}b", json!({}), "ab" ; "comment")]
#[test_case("<ul>\n  {{- range .Items}}\n  <li>{{.}}</li>\n  {{- end}}\n</ul>", json!({"Items": [1, 2]}), "<ul>\n  <li>1</li>\n  <li>2</li>\n</ul>" ; "trim markers")]
fn test_render(source: &str, data: Value, expected: &str) {
    assert_eq!(render(source, data).unwrap(), expected);
}

#[test]
fn test_missing_output_field_is_an_error() {
    let err = render("<p>{{.Name}}</p>", json!({})).unwrap_err();
    assert_eq!(err, TemplateError::FieldNotFound { path: ".Name".into() });
    assert!(!err.is_template_fault());
}

#[test]
fn test_range_over_scalar_is_an_error() {
    let err = render("{{range .N}}x{{end}}", json!({"N": 5})).unwrap_err();
    assert!(matches!(err, TemplateError::NotIterable { .. }));
}

#[test]
fn test_unsupported_is_template_fault() {
    let err = Template::parse("t", "{{.A | len}}").unwrap_err();
    assert!(err.is_template_fault());
}

#[test]
fn test_renderer_is_object_safe() {
    let renderer: Box<dyn Renderer> = Box::new(TemplateRenderer);
    let template = Template::parse("t", "<b>{{.}}</b>").unwrap();
    assert_eq!(renderer.render(&template, &json!("x")).unwrap(), "<b>x</b>");
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_plain_text_renders_verbatim(text in "[a-zA-Z0-9 <>/=\"]{0,64}") {
        let out = render(&text, json!({})).unwrap();
        prop_assert_eq!(out, text, "text without actions should pass through");
    }

    #[test]
    fn prop_field_output_is_escaped(value in ".{0,32}") {
        let out = render("{{.V}}", json!({"V": value})).unwrap();
        prop_assert!(!out.contains('<') && !out.contains('>'), "output {:?} left markup unescaped", out);
    }
}
