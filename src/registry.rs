//! Built-in prompt templates, tone modifiers and length guidelines
//!
//! The registry is built once at startup and shared behind an `Arc`.
//! Only read accessors are exposed.

use std::collections::HashMap;
use log::debug;
use crate::error::Error;
use crate::{ContentType, Length, Style, Tone};

/// Template for one rephrasing style
#[derive(Debug, Clone, PartialEq)]
pub struct StyleTemplate
{   pub system_prompt: &'static str
  , /// Uses the `{text}` placeholder
    pub user_template: &'static str
  , pub temperature: f32
}

/// Template for one content generation mode
#[derive(Debug, Clone, PartialEq)]
pub struct ContentTemplate
{   pub system_prompt: &'static str
  , /// Uses `{prompt}`, `{context}`, `{tone}` and `{length}`
    pub user_template: &'static str
  , pub temperature: f32
  , /// Fixed per mode; the caller cannot change it
    pub requires_context: bool
}

/// Token budget and prose guidance for a named length
#[derive(Debug, Clone, PartialEq)]
pub struct LengthGuideline
{   pub token_budget: u32
  , pub description: &'static str
  , pub brainstorm_items: &'static str
  , pub detail_level: &'static str
}

/// Immutable lookup tables for every closed mode set
#[derive(Debug, Clone)]
pub struct TemplateRegistry
{   styles: HashMap<Style, StyleTemplate>
  , contents: HashMap<ContentType, ContentTemplate>
  , tones: HashMap<Tone, &'static str>
  , lengths: HashMap<Length, LengthGuideline>
}

impl Default for TemplateRegistry
{   fn default() -> Self
    {   Self::builtin()
    }
}

impl TemplateRegistry
{   /// Build the registry from the built-in tables
    pub fn builtin() -> Self
    {   let registry = TemplateRegistry
        {   styles: style_table().into_iter().collect()
          , contents: content_table().into_iter().collect()
          , tones: tone_table().into_iter().collect()
          , lengths: length_table().into_iter().collect()
        };
        debug!(
          "Template registry ready: {} styles, {} content types, {} tones, {} lengths",
          registry.styles.len(),
          registry.contents.len(),
          registry.tones.len(),
          registry.lengths.len()
        );
        registry
    }

    pub fn resolve_style(&self, style: Style)
      -> Result<&StyleTemplate, Error>
    {   self.styles.get(&style).ok_or_else(|| {
          Error::UnknownEnumValue
          {   kind: "style"
            , value: style.to_string()
          }
        })
    }

    pub fn resolve_content(&self, kind: ContentType)
      -> Result<&ContentTemplate, Error>
    {   self.contents.get(&kind).ok_or_else(|| {
          Error::UnknownEnumValue
          {   kind: "content type"
            , value: kind.to_string()
          }
        })
    }

    pub fn resolve_tone(&self, tone: Tone)
      -> Result<&'static str, Error>
    {   self.tones.get(&tone).copied().ok_or_else(|| {
          Error::UnknownEnumValue
          {   kind: "tone"
            , value: tone.to_string()
          }
        })
    }

    pub fn resolve_length(&self, length: Length)
      -> Result<&LengthGuideline, Error>
    {   self.lengths.get(&length).ok_or_else(|| {
          Error::UnknownEnumValue
          {   kind: "length"
            , value: length.to_string()
          }
        })
    }
}

fn style_table() -> [(Style, StyleTemplate); 4]
{   [ ( Style::Formal
      , StyleTemplate
        {   system_prompt: "You are a professional writing assistant specializing in formal communication. \
Transform the given text into polished, professional language suitable for business correspondence, \
academic papers, or official documents. Maintain the original meaning and key information while \
enhancing clarity, precision, and formality. Use appropriate business vocabulary and eliminate \
colloquialisms. Structure sentences for maximum clarity and impact."
          , user_template: "Transform this text into formal, professional language:\n\n\"{text}\"\n\n\
Ensure the tone is appropriate for business or academic contexts while preserving all key information."
          , temperature: 0.4
        }
      )
    , ( Style::Casual
      , StyleTemplate
        {   system_prompt: "You are a conversational writing assistant who excels at making text sound natural and approachable. \
Rephrase the given text using everyday language that feels like a friendly conversation. \
Use contractions, simple vocabulary, and a warm tone while maintaining the original meaning. \
Make it sound like something you'd say to a friend or colleague in an informal setting."
          , user_template: "Rewrite this text in a casual, friendly conversational style:\n\n\"{text}\"\n\n\
Make it sound natural and approachable, like you're talking to a friend."
          , temperature: 0.7
        }
      )
    , ( Style::Creative
      , StyleTemplate
        {   system_prompt: "You are a creative writing specialist who transforms ordinary text into engaging, memorable content. \
Use vivid imagery, compelling metaphors, varied sentence structures, and dynamic vocabulary. \
Capture the reader's attention while preserving the core message. Employ literary techniques \
like alliteration, rhythm, and descriptive language to make the text more captivating and memorable."
          , user_template: "Transform this text into creative, engaging content that captures attention:\n\n\"{text}\"\n\n\
Use vivid language, interesting expressions, and creative techniques while maintaining the core message."
          , temperature: 0.9
        }
      )
    , ( Style::Concise
      , StyleTemplate
        {   system_prompt: "You are an expert in concise communication who eliminates wordiness without losing meaning. \
Remove redundant phrases, unnecessary qualifiers, and verbose constructions. \
Use active voice, strong verbs, and precise nouns. Combine related ideas efficiently and \
eliminate filler words while ensuring all essential information remains intact and clear."
          , user_template: "Make this text as concise and clear as possible while retaining all important information:\n\n\"{text}\"\n\n\
Eliminate redundancy and wordiness, but keep all key points."
          , temperature: 0.2
        }
      )
    ]
}

fn content_table() -> [(ContentType, ContentTemplate); 6]
{   [ ( ContentType::New
      , ContentTemplate
        {   system_prompt: "You are a versatile content creator who produces original, well-structured content tailored to specific needs. \
Create engaging material with clear organization, smooth transitions, and compelling opening and closing statements. \
Use relevant examples, concrete details, and logical flow. Adapt your writing style precisely to match \
the requested tone and length requirements. Ensure your content is informative, actionable, and memorable."
          , user_template: "Create original content about: {prompt}\n\nRequired tone: {tone}\nTarget length: {length}\n\n\
Make it engaging, well-structured, and valuable to readers."
          , temperature: 0.8
          , requires_context: false
        }
      )
    , ( ContentType::Continue
      , ContentTemplate
        {   system_prompt: "You are a skilled continuation writer who seamlessly extends existing content. \
Analyze the provided text's tone, style, vocabulary level, and subject matter. Match these elements precisely \
while advancing the narrative or argument naturally. Maintain consistency in perspective, tense, and voice. \
Create smooth transitions and logical progression from the existing content. Avoid repetition of already-covered points."
          , user_template: "Continue writing naturally from this text:\n\n\"{context}\"\n\n\
Specific instructions: {prompt}\nMaintain this tone: {tone}\nTarget length for continuation: {length}\n\n\
Ensure seamless flow and consistency with the existing content."
          , temperature: 0.6
          , requires_context: true
        }
      )
    , ( ContentType::Expand
      , ContentTemplate
        {   system_prompt: "You are an expert content developer who adds depth and richness to existing material. \
Take the provided content and elaborate with relevant examples, detailed explanations, supporting evidence, \
practical applications, and additional context. Maintain the original structure and key points while \
significantly enhancing value. Add subsections, bullet points, or numbered lists where appropriate for clarity."
          , user_template: "Expand and elaborate on this content with additional depth and detail:\n\n\"{context}\"\n\n\
Specific focus areas: {prompt}\nTone to maintain: {tone}\nDesired expanded length: {length}\n\n\
Add examples, explanations, and practical insights while preserving the original message."
          , temperature: 0.7
          , requires_context: true
        }
      )
    , ( ContentType::Brainstorm
      , ContentTemplate
        {   system_prompt: "You are a creative brainstorming facilitator who generates diverse, actionable ideas. \
Provide a variety of creative solutions, approaches, and perspectives on the given topic. \
Include both conventional and innovative ideas. Organize your suggestions logically with clear categories. \
For each idea, provide a brief explanation of its potential value or application. \
Encourage further exploration with thought-provoking questions or next steps."
          , user_template: "Generate diverse brainstorming ideas for: {prompt}\n\nAdditional context: {context}\n\
Approach with this tone: {tone}\nNumber of ideas (based on {length}): Provide comprehensive brainstorming\n\n\
Organize ideas into categories and include brief explanations for each suggestion."
          , temperature: 0.95
          , requires_context: false
        }
      )
    , ( ContentType::Outline
      , ContentTemplate
        {   system_prompt: "You are a content strategist who creates comprehensive, hierarchical outlines. \
Develop a logical structure with main sections, subsections, and key points. \
Include brief descriptions for each section explaining what should be covered. \
Ensure logical flow and comprehensive coverage of the topic. \
Use proper formatting with clear hierarchy (I, II, III / A, B, C / 1, 2, 3)."
          , user_template: "Create a detailed outline for: {prompt}\n\nRelevant context: {context}\n\
Intended tone: {tone}\nOutline detail level ({length}): Provide appropriate depth\n\n\
Structure with main sections, subsections, and brief descriptions of what each part should cover."
          , temperature: 0.5
          , requires_context: false
        }
      )
    , ( ContentType::Summarize
      , ContentTemplate
        {   system_prompt: "You are a professional summarization specialist who distills complex content into clear, actionable summaries. \
Identify and extract the most important points, key insights, main arguments, and essential information. \
Organize the summary logically with clear structure. Use bullet points or numbered lists when appropriate. \
Maintain the original meaning while making the content more accessible and digestible. \
Highlight any actionable items, conclusions, or recommendations."
          , user_template: "Create a comprehensive summary of this content:\n\n\"{context}\"\n\n\
Specific focus or angle: {prompt}\nSummary tone: {tone}\nSummary length: {length}\n\n\
Capture all key points, main insights, and important details while making it clear and well-organized."
          , temperature: 0.4
          , requires_context: true
        }
      )
    ]
}

fn tone_table() -> [(Tone, &'static str); 5]
{   [ ( Tone::Professional
      , "Adopt a professional, authoritative tone using formal language, industry-appropriate terminology, \
and structured presentation. Maintain objectivity and focus on facts, benefits, and actionable insights. \
Use confident but respectful language suitable for business contexts."
      )
    , ( Tone::Casual
      , "Write in a relaxed, conversational tone that feels approachable and friendly. Use everyday language, \
contractions, and personal pronouns. Make it feel like a helpful conversation with a knowledgeable friend. \
Keep it warm and engaging without being overly formal."
      )
    , ( Tone::Creative
      , "Employ an imaginative, dynamic tone with colorful language, creative analogies, and engaging storytelling elements. \
Use varied sentence structures, vivid descriptions, and unexpected comparisons to capture attention. \
Be expressive and memorable while maintaining clarity."
      )
    , ( Tone::Academic
      , "Use a scholarly, analytical tone with precise terminology, evidence-based arguments, and logical structure. \
Include appropriate citations concepts, maintain objectivity, and demonstrate depth of knowledge. \
Write with authority while acknowledging complexity and nuance."
      )
    , ( Tone::Persuasive
      , "Craft compelling, influential content designed to convince and motivate action. Use strong arguments, \
emotional appeals where appropriate, concrete benefits, and clear calls to action. \
Build credibility while creating urgency and desire."
      )
    ]
}

fn length_table() -> [(Length, LengthGuideline); 3]
{   [ ( Length::Short
      , LengthGuideline
        {   token_budget: 250
          , description: "1-2 focused paragraphs with key points only"
          , brainstorm_items: "5-8 well-explained ideas"
          , detail_level: "Concise but complete coverage of essential points"
        }
      )
    , ( Length::Medium
      , LengthGuideline
        {   token_budget: 600
          , description: "3-5 well-developed paragraphs with examples and details"
          , brainstorm_items: "10-15 diverse ideas with explanations"
          , detail_level: "Comprehensive coverage with supporting details and examples"
        }
      )
    , ( Length::Long
      , LengthGuideline
        {   token_budget: 1200
          , description: "6+ detailed paragraphs with thorough exploration"
          , brainstorm_items: "20+ creative ideas organized in categories"
          , detail_level: "In-depth analysis with multiple examples, subsections, and comprehensive coverage"
        }
      )
    ]
}
