//! Placeholder substitution for prompt templates
//!
//! A placeholder is a lowercase name in single braces, e.g. `{text}`.
//! Rendering walks the template once; filled values are inserted
//! verbatim and never scanned for placeholders themselves.

use std::collections::{HashMap, HashSet};
use lazy_static::lazy_static;
use log::trace;
use regex::{Captures, Regex};
use crate::error::Error;
use crate::registry::{ContentTemplate, LengthGuideline, StyleTemplate};
use crate::{ContentType, Length, Tone};

pub const NO_CONTEXT: &str = "No additional context provided";

lazy_static! {
    static ref PLACEHOLDER_RE: Regex
      = Regex::new(r"\{([a-z_]+)\}").expect("placeholder pattern");
}

/// Fully rendered system instruction and user message
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedMessages
{   pub system: String
  , pub user: String
}

/// Names of every placeholder in a template
pub fn placeholders(template: &str) -> HashSet<String>
{   PLACEHOLDER_RE
      .captures_iter(template)
      .map(|c| c[1].to_string())
      .collect()
}

/// Substitute every placeholder from `values`.
/// A placeholder without a value is reported, never left in place.
pub fn render(template: &str, values: &HashMap<&str, &str>)
  -> Result<String, Error>
{   if let Some(missing) = placeholders(template)
      .into_iter()
      .find(|name| !values.contains_key(name.as_str()))
    {   return Err(Error::UnrenderedPlaceholder(missing));
    }

    let rendered = PLACEHOLDER_RE.replace_all(template, |c: &Captures| {
      values.get(&c[1]).copied().unwrap_or_default().to_string()
    });
    Ok(rendered.into_owned())
}

/// Fail when `kind` needs context and `context` is absent or blank
pub fn require_context(
  kind: ContentType
, template: &ContentTemplate
, context: Option<&str>
) -> Result<(), Error>
{   let blank = context.map_or(true, |c| c.trim().is_empty());
    if template.requires_context && blank
    {   return Err(Error::MissingRequiredContext(kind));
    }
    Ok(())
}

/// Render the message pair for a rephrase call
pub fn render_style(template: &StyleTemplate, text: &str)
  -> Result<RenderedMessages, Error>
{   let values = HashMap::from([("text", text)]);
    Ok(RenderedMessages
    {   system: template.system_prompt.to_string()
      , user: render(template.user_template, &values)?
    })
}

/// Inputs for a content generation render
pub struct ContentParts<'a>
{   pub kind: ContentType
  , pub template: &'a ContentTemplate
  , pub tone: Tone
  , pub tone_modifier: &'a str
  , pub length: Length
  , pub guideline: &'a LengthGuideline
  , pub prompt: &'a str
  , pub context: Option<&'a str>
}

/// Render the message pair for a content generation call
pub fn render_content(parts: &ContentParts<'_>)
  -> Result<RenderedMessages, Error>
{   require_context(parts.kind, parts.template, parts.context)?;

    let system = format!(
      "{}\n\n{}\n\nTarget length: {}",
      parts.template.system_prompt,
      parts.tone_modifier,
      parts.guideline.description
    );

    // brainstorm asks for an item count instead of a length name
    let length = match parts.kind
    {   ContentType::Brainstorm => parts.guideline.brainstorm_items
      , _ => parts.length.as_str()
    };
    let context = parts.context
      .filter(|c| !c.trim().is_empty())
      .unwrap_or(NO_CONTEXT);

    let values = HashMap::from([
      ("prompt", parts.prompt)
    , ("context", context)
    , ("tone", parts.tone.as_str())
    , ("length", length)
    ]);
    let user = render(parts.template.user_template, &values)?;
    trace!("Rendered {} user message: {}", parts.kind, user);

    Ok(RenderedMessages { system, user })
}
