pub mod error;
pub mod config;
pub mod providers;
pub mod request;
pub mod registry;
pub mod render;
pub mod client;
pub mod server;
pub mod chat;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub use client::Orchestrator;
pub use error::Error;
pub use registry::TemplateRegistry;

/*

rephrase-gateway: a thin service in front of the Groq chat
completion API. Callers pick a rephrasing style or a content
generation mode; the gateway resolves a fixed template, renders
the message pair, makes one completion call and reshapes the
answer.

src/
├── lib.rs          # Mode enums and re-exports
├── error.rs        # Error type
├── config.rs       # Provider and server configuration
├── registry.rs     # Built-in templates, tones, length guidelines
├── render.rs       # Placeholder substitution
├── client.rs       # Completion orchestrator
├── request.rs      # Request / response bodies
├── providers/      # Completion backends (Groq)
├── server.rs       # HTTP routes
└── chat.rs         # Interactive terminal mode

*/

/// GATEWAY MODES:
///
/// Every mode set is closed. Parsing a name outside the set
/// fails with `Error::UnknownEnumValue`.

/// Rephrasing style applied to existing text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Style
{   Formal
  , Casual
  , Creative
  , Concise
}

/// Content generation mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentType
{   New
  , Continue
  , Expand
  , Brainstorm
  , Outline
  , Summarize
}

/// Tone modifier layered on top of a content type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Tone
{   Professional
  , Casual
  , Creative
  , Academic
  , Persuasive
}

/// Named length budget for generated content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Length
{   Short
  , Medium
  , Long
}

impl Style
{   pub const ALL: [Style; 4] = [
      Style::Formal
    , Style::Casual
    , Style::Creative
    , Style::Concise
    ];

    pub fn as_str(&self) -> &'static str
    {   match self
        {   Style::Formal => "formal"
          , Style::Casual => "casual"
          , Style::Creative => "creative"
          , Style::Concise => "concise"
        }
    }

    pub fn label(&self) -> &'static str
    {   match self
        {   Style::Formal => "Formal"
          , Style::Casual => "Casual"
          , Style::Creative => "Creative"
          , Style::Concise => "Concise"
        }
    }

    pub fn description(&self) -> &'static str
    {   match self
        {   Style::Formal => "Professional and business-appropriate tone"
          , Style::Casual => "Conversational and friendly tone"
          , Style::Creative => "Engaging and expressive style"
          , Style::Concise => "Brief and to-the-point"
        }
    }
}

impl ContentType
{   pub const ALL: [ContentType; 6] = [
      ContentType::New
    , ContentType::Continue
    , ContentType::Expand
    , ContentType::Brainstorm
    , ContentType::Outline
    , ContentType::Summarize
    ];

    pub fn as_str(&self) -> &'static str
    {   match self
        {   ContentType::New => "new"
          , ContentType::Continue => "continue"
          , ContentType::Expand => "expand"
          , ContentType::Brainstorm => "brainstorm"
          , ContentType::Outline => "outline"
          , ContentType::Summarize => "summarize"
        }
    }

    pub fn label(&self) -> &'static str
    {   match self
        {   ContentType::New => "New Content"
          , ContentType::Continue => "Continue Writing"
          , ContentType::Expand => "Expand Ideas"
          , ContentType::Brainstorm => "Brainstorm"
          , ContentType::Outline => "Create Outline"
          , ContentType::Summarize => "Summarize"
        }
    }

    pub fn description(&self) -> &'static str
    {   match self
        {   ContentType::New =>
              "Create completely new content from scratch"
          , ContentType::Continue =>
              "Continue from where the provided text left off"
          , ContentType::Expand =>
              "Elaborate and expand on existing content"
          , ContentType::Brainstorm =>
              "Generate creative ideas and bullet points"
          , ContentType::Outline =>
              "Generate a structured outline for the topic"
          , ContentType::Summarize =>
              "Create a concise summary of provided content"
        }
    }
}

impl Tone
{   pub const ALL: [Tone; 5] = [
      Tone::Professional
    , Tone::Casual
    , Tone::Creative
    , Tone::Academic
    , Tone::Persuasive
    ];

    pub fn as_str(&self) -> &'static str
    {   match self
        {   Tone::Professional => "professional"
          , Tone::Casual => "casual"
          , Tone::Creative => "creative"
          , Tone::Academic => "academic"
          , Tone::Persuasive => "persuasive"
        }
    }

    pub fn label(&self) -> &'static str
    {   match self
        {   Tone::Professional => "Professional"
          , Tone::Casual => "Casual"
          , Tone::Creative => "Creative"
          , Tone::Academic => "Academic"
          , Tone::Persuasive => "Persuasive"
        }
    }

    pub fn description(&self) -> &'static str
    {   match self
        {   Tone::Professional => "Business-appropriate, formal tone"
          , Tone::Casual => "Friendly, conversational tone"
          , Tone::Creative => "Imaginative and engaging style"
          , Tone::Academic => "Scholarly, research-oriented tone"
          , Tone::Persuasive => "Convincing and compelling tone"
        }
    }
}

impl Length
{   pub const ALL: [Length; 3] = [
      Length::Short
    , Length::Medium
    , Length::Long
    ];

    pub fn as_str(&self) -> &'static str
    {   match self
        {   Length::Short => "short"
          , Length::Medium => "medium"
          , Length::Long => "long"
        }
    }

    pub fn label(&self) -> &'static str
    {   match self
        {   Length::Short => "Short"
          , Length::Medium => "Medium"
          , Length::Long => "Long"
        }
    }
}

macro_rules! closed_set_names
{   ($ty:ident, $kind:literal) => {
      impl fmt::Display for $ty
      {   fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
          {   f.write_str(self.as_str())
          }
      }

      impl FromStr for $ty
      {   type Err = Error;

          fn from_str(s: &str) -> Result<Self, Self::Err>
          {   let wanted = s.trim().to_ascii_lowercase();
              $ty::ALL
                .iter()
                .copied()
                .find(|v| v.as_str() == wanted)
                .ok_or_else(|| Error::UnknownEnumValue
                {   kind: $kind
                  , value: s.to_string()
                })
          }
      }
    };
}

closed_set_names!(Style, "style");
closed_set_names!(ContentType, "content type");
closed_set_names!(Tone, "tone");
closed_set_names!(Length, "length");

#[cfg(test)]
mod tests
{   use super::*;

    #[test]
    fn names_parse_case_insensitively()
    {   assert_eq!("Formal".parse::<Style>(), Ok(Style::Formal));
        assert_eq!(
          " brainstorm ".parse::<ContentType>()
        , Ok(ContentType::Brainstorm)
        );
        assert_eq!("ACADEMIC".parse::<Tone>(), Ok(Tone::Academic));
        assert_eq!("long".parse::<Length>(), Ok(Length::Long));
    }

    #[test]
    fn unknown_names_are_rejected()
    {   assert_eq!(
          "poetic".parse::<Style>()
        , Err(Error::UnknownEnumValue
          {   kind: "style"
            , value: "poetic".to_string()
          })
        );
        assert!("rewrite".parse::<ContentType>().is_err());
        assert!("sarcastic".parse::<Tone>().is_err());
        assert!("epic".parse::<Length>().is_err());
    }

    #[test]
    fn serde_uses_lowercase_names()
    {   let json = serde_json::to_string(&ContentType::Summarize)
          .unwrap();
        assert_eq!(json, "\"summarize\"");
        let tone: Tone = serde_json::from_str("\"persuasive\"")
          .unwrap();
        assert_eq!(tone, Tone::Persuasive);
        assert!(serde_json::from_str::<Style>("\"poetic\"").is_err());
    }

    #[test]
    fn display_matches_wire_name()
    {   for style in Style::ALL
        {   assert_eq!(style.to_string(), style.as_str());
        }
        assert_eq!(Length::Medium.to_string(), "medium");
    }
}
