//! Minimal HTML form reader
//!
//! Pages are parsed with html5ever into an `RcDom`, then the named `<form>` is walked
//! for the action, the method, and the default value of every control a browser would
//! submit. Controls keep document order.

use crate::core::error::FormError;
use html5ever::tendril::TendrilSink;
use html5ever::{ParseOpts, parse_document};
use markup5ever_rcdom::{Handle, NodeData, RcDom};
use reqwest::Url;
use reqwest::blocking::multipart;
use std::io;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
  /// Anything submitted as `name=value`
  Value,
  /// `<input type="file">`
  File,
  /// Submit button; only the first one is sent
  Submit,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
  pub name: String,
  pub value: String,
  pub kind: FieldKind,
}

#[derive(Debug, Clone)]
pub struct HtmlForm {
  pub name: String,
  /// Upper-case HTTP method, `GET` when unspecified
  pub method: String,
  /// Absolute submission URL
  pub action: Url,
  pub fields: Vec<Field>,
}

/// Tag name and attributes of an element node; the parser lower-cases both
struct Element {
  tag: String,
  attrs: Vec<(String, String)>,
}

impl Element {
  fn of(node: &Handle) -> Option<Self> {
    match &node.data {
      NodeData::Element { name, attrs, .. } => Some(Self {
        tag: name.local.to_string(),
        attrs: attrs
          .borrow()
          .iter()
          .map(|a| (a.name.local.to_string(), a.value.to_string()))
          .collect(),
      }),
      _ => None,
    }
  }

  fn attr(&self, key: &str) -> Option<&str> {
    self.attrs.iter().find(|(k, _)| k == key).map(|(_, v)| v.as_str())
  }

  fn has_attr(&self, key: &str) -> bool {
    self.attrs.iter().any(|(k, _)| k == key)
  }
}

/// Every node below `node`, in document order
fn descendants(node: &Handle) -> Vec<Handle> {
  let mut out = Vec::new();
  collect_descendants(node, &mut out);
  out
}

fn collect_descendants(node: &Handle, out: &mut Vec<Handle>) {
  for child in node.children.borrow().iter() {
    out.push(child.clone());
    collect_descendants(child, out);
  }
}

fn text_content(node: &Handle) -> String {
  let mut text = String::new();
  for n in std::iter::once(node.clone()).chain(descendants(node)) {
    if let NodeData::Text { contents } = &n.data {
      text.push_str(&contents.borrow());
    }
  }
  text
}

fn input_field(el: &Element) -> Option<Field> {
  let kind = el.attr("type").unwrap_or("text").to_ascii_lowercase();
  let name = el.attr("name").unwrap_or_default().to_string();
  let value = el.attr("value").unwrap_or_default().to_string();
  match kind.as_str() {
    "submit" | "image" => Some(Field {
      name,
      value,
      kind: FieldKind::Submit,
    }),
    "reset" | "button" => None,
    _ if name.is_empty() => None,
    "file" => Some(Field {
      name,
      value: String::new(),
      kind: FieldKind::File,
    }),
    "checkbox" | "radio" if !el.has_attr("checked") => None,
    "checkbox" | "radio" => Some(Field {
      name,
      value: if value.is_empty() { "on".to_string() } else { value },
      kind: FieldKind::Value,
    }),
    _ => Some(Field {
      name,
      value,
      kind: FieldKind::Value,
    }),
  }
}

fn button_field(el: &Element) -> Option<Field> {
  if !el.attr("type").unwrap_or("submit").eq_ignore_ascii_case("submit") {
    return None;
  }
  Some(Field {
    name: el.attr("name").unwrap_or_default().to_string(),
    value: el.attr("value").unwrap_or_default().to_string(),
    kind: FieldKind::Submit,
  })
}

fn textarea_field(el: &Element, node: &Handle) -> Option<Field> {
  let name = el.attr("name").filter(|n| !n.is_empty())?;
  Some(Field {
    name: name.to_string(),
    value: text_content(node),
    kind: FieldKind::Value,
  })
}

/// The selected option, or the first one
fn select_field(el: &Element, node: &Handle) -> Option<Field> {
  let name = el.attr("name").filter(|n| !n.is_empty())?.to_string();
  let options: Vec<(Element, Handle)> = descendants(node)
    .into_iter()
    .filter_map(|n| Element::of(&n).filter(|e| e.tag == "option").map(|e| (e, n)))
    .collect();
  let (option, option_node) = options
    .iter()
    .find(|(e, _)| e.has_attr("selected"))
    .or_else(|| options.first())?;
  let value = match option.attr("value") {
    Some(value) => value.to_string(),
    None => text_content(option_node).split_whitespace().collect::<Vec<_>>().join(" "),
  };
  Some(Field {
    name,
    value,
    kind: FieldKind::Value,
  })
}

fn parse_fields(form: &Handle) -> Vec<Field> {
  descendants(form)
    .iter()
    .filter_map(|node| {
      let el = Element::of(node)?;
      match el.tag.as_str() {
        "input" => input_field(&el),
        "button" => button_field(&el),
        "textarea" => textarea_field(&el, node),
        "select" => select_field(&el, node),
        _ => None,
      }
    })
    .collect()
}

impl HtmlForm {
  /// Find the form called `name` (and using `method`, if given) on a page
  pub fn find(html: &str, page_url: &Url, name: &str, method: Option<&str>) -> Result<Self, FormError> {
    let dom = parse_document(RcDom::default(), ParseOpts::default()).one(html);
    for node in descendants(&dom.document) {
      let Some(el) = Element::of(&node).filter(|e| e.tag == "form") else {
        continue;
      };
      if el.attr("name") != Some(name) {
        continue;
      }
      let form_method = el.attr("method").unwrap_or("GET").to_ascii_uppercase();
      if method.is_some_and(|m| !m.eq_ignore_ascii_case(&form_method)) {
        continue;
      }
      let action = match el.attr("action").map(str::trim).filter(|a| !a.is_empty()) {
        Some(action) => page_url.join(action).map_err(|e| FormError::BadAction {
          action: action.to_string(),
          reason: e.to_string(),
        })?,
        None => page_url.clone(),
      };
      return Ok(Self {
        name: name.to_string(),
        method: form_method,
        action,
        fields: parse_fields(&node),
      });
    }
    Err(FormError::FormNotFound {
      name: name.to_string(),
      url: page_url.to_string(),
    })
  }

  /// Set the value of a named control
  pub fn set(&mut self, field: &str, value: &str) -> Result<(), FormError> {
    let control = self
      .fields
      .iter_mut()
      .find(|f| f.name == field && f.kind == FieldKind::Value)
      .ok_or_else(|| FormError::FieldNotFound {
        form: self.name.clone(),
        field: field.to_string(),
      })?;
    control.value = value.to_string();
    Ok(())
  }

  pub fn value(&self, field: &str) -> Option<&str> {
    self.fields.iter().find(|f| f.name == field).map(|f| f.value.as_str())
  }

  /// Name of the first file input
  pub fn first_file_input(&self) -> Option<&str> {
    self
      .fields
      .iter()
      .find(|f| f.kind == FieldKind::File)
      .map(|f| f.name.as_str())
  }

  /// Controls that get submitted: values, file inputs, and the first submit button
  fn submitted(&self) -> impl Iterator<Item = &Field> {
    let first_submit = self.fields.iter().position(|f| f.kind == FieldKind::Submit);
    self
      .fields
      .iter()
      .enumerate()
      .filter(move |(i, f)| f.kind != FieldKind::Submit || Some(*i) == first_submit)
      .map(|(_, f)| f)
      .filter(|f| !f.name.is_empty())
  }

  /// `name=value` pairs for an url-encoded submission
  pub fn pairs(&self) -> Vec<(String, String)> {
    self
      .submitted()
      .filter(|f| f.kind != FieldKind::File)
      .map(|f| (f.name.clone(), f.value.clone()))
      .collect()
  }

  /// Multipart body with `file` attached to the `file_field` input
  pub fn multipart(&self, file_field: &str, file: &Path) -> io::Result<multipart::Form> {
    let mut body = multipart::Form::new();
    for field in self.submitted() {
      body = match field.kind {
        FieldKind::File if field.name == file_field => body.file(field.name.clone(), file)?,
        FieldKind::File => body.part(field.name.clone(), multipart::Part::bytes(Vec::new()).file_name("")),
        _ => body.text(field.name.clone(), field.value.clone()),
      };
    }
    Ok(body)
  }
}
