use std::sync::Arc;
use std::time::Instant;
use log::{debug, error, info};
use crate::error::Error;
use crate::providers::{ChatMessage, CompletionBackend, CompletionRequest};
use crate::registry::TemplateRegistry;
use crate::render::{self, ContentParts, RenderedMessages};
use crate::request::{
  ContentRequest, Overrides, RephraseRequest, Selection
, TransformationResult
};
use crate::{ContentType, Length, Style, Tone};

/// Hard ceiling on `max_tokens`, whatever the caller asks for
pub const MAX_TOKENS_CEILING: u32 = 2000;
pub const DEFAULT_REPHRASE_MAX_TOKENS: u32 = 1000;
pub const REPHRASE_BATCH_LIMIT: usize = 10;
pub const CONTENT_BATCH_LIMIT: usize = 5;
/// Nucleus sampling stays fixed; callers cannot override it
const TOP_P: f32 = 1.0;

/// Drives one completion call per transformation.
/// Cheap to clone; the registry and backend are shared.
#[derive(Clone)]
pub struct Orchestrator
{   registry: Arc<TemplateRegistry>
  , backend: Arc<dyn CompletionBackend>
}

impl Orchestrator
{   pub fn new(
      registry: Arc<TemplateRegistry>
    , backend: Arc<dyn CompletionBackend>
    ) -> Self
    {   debug!("Creating Orchestrator for model: {}", backend.model());
        Orchestrator
        {   registry
          , backend
        }
    }

    pub fn registry(&self) -> &TemplateRegistry
    {   &self.registry
    }

    pub fn model(&self) -> &str
    {   self.backend.model()
    }

    /// Rephrase `text` in the given style
    pub async fn rephrase(
      &self
    , text: &str
    , style: Style
    , overrides: Overrides
    ) -> Result<TransformationResult, Error>
    {   info!(
          "Rephrasing request: style={}, length={}",
          style, text.chars().count()
        );

        if text.trim().is_empty()
        {   return Err(Error::EmptyInput("Text".to_string()));
        }

        let template = self.registry.resolve_style(style)?;
        let messages = render::render_style(template, text)?;

        let request = completion_request(
          messages
        , overrides.temperature.unwrap_or(template.temperature)
        , overrides.max_tokens.unwrap_or(DEFAULT_REPHRASE_MAX_TOKENS)
        );

        let (raw, processing_time, tokens_used)
          = self.call(request, "rephrase text").await?;
        let text_out = strip_wrapping_quotes(raw.trim()).to_string();

        info!(
          "rephrase success: original_length={}, rephrased_length={}, style={}, processing_time={:.3}",
          text.chars().count(),
          text_out.chars().count(),
          style,
          processing_time
        );

        Ok(TransformationResult
        {   text: text_out
          , processing_time
          , tokens_used
          , model: self.model().to_string()
          , selection: Selection::Rephrase(style)
        })
    }

    /// Generate content of the given type
    pub async fn generate_content(
      &self
    , prompt: &str
    , kind: ContentType
    , tone: Tone
    , length: Length
    , context: Option<&str>
    , overrides: Overrides
    ) -> Result<TransformationResult, Error>
    {   info!(
          "Content generation request: type={}, tone={}, length={}",
          kind, tone, length
        );

        if prompt.trim().is_empty()
        {   return Err(Error::EmptyInput("Prompt".to_string()));
        }

        let template = self.registry.resolve_content(kind)?;
        render::require_context(kind, template, context)?;
        let tone_modifier = self.registry.resolve_tone(tone)?;
        let guideline = self.registry.resolve_length(length)?;

        let messages = render::render_content(&ContentParts
        {   kind
          , template
          , tone
          , tone_modifier
          , length
          , guideline
          , prompt
          , context
        })?;

        let request = completion_request(
          messages
        , overrides.temperature.unwrap_or(template.temperature)
        , overrides.max_tokens.unwrap_or(guideline.token_budget)
        );

        let (raw, processing_time, tokens_used)
          = self.call(request, "generate content").await?;
        let text_out = raw.trim().to_string();

        info!(
          "content_generation success: prompt_length={}, context_length={}, generated_length={}, type={}, tone={}, length={}, processing_time={:.3}",
          prompt.chars().count(),
          context.map_or(0, |c| c.chars().count()),
          text_out.chars().count(),
          kind,
          tone,
          length,
          processing_time
        );

        Ok(TransformationResult
        {   text: text_out
          , processing_time
          , tokens_used
          , model: self.model().to_string()
          , selection: Selection::Content { kind, tone, length }
        })
    }

    /// Validate and run one rephrase request body
    pub async fn rephrase_request(&self, request: &RephraseRequest)
      -> Result<TransformationResult, Error>
    {   request.validate()?;
        self.rephrase(&request.text, request.style, request.overrides())
          .await
    }

    /// Validate and run one content request body
    pub async fn generate_request(&self, request: &ContentRequest)
      -> Result<TransformationResult, Error>
    {   request.validate()?;
        self.generate_content(
          &request.prompt
        , request.kind
        , request.tone
        , request.length
        , request.context.as_deref()
        , request.overrides()
        ).await
    }

    /// Rephrase up to `REPHRASE_BATCH_LIMIT` items, one at a time.
    /// A failing item does not stop the rest.
    pub async fn rephrase_batch(&self, requests: &[RephraseRequest])
      -> Result<Vec<Result<TransformationResult, Error>>, Error>
    {   check_batch(requests.len(), REPHRASE_BATCH_LIMIT)?;
        debug!("Rephrase batch of {} items", requests.len());

        let mut results = Vec::with_capacity(requests.len());
        for request in requests
        {   results.push(self.rephrase_request(request).await);
        }
        Ok(results)
    }

    /// Generate content for up to `CONTENT_BATCH_LIMIT` items
    pub async fn generate_content_batch(&self, requests: &[ContentRequest])
      -> Result<Vec<Result<TransformationResult, Error>>, Error>
    {   check_batch(requests.len(), CONTENT_BATCH_LIMIT)?;
        debug!("Content batch of {} items", requests.len());

        let mut results = Vec::with_capacity(requests.len());
        for request in requests
        {   results.push(self.generate_request(request).await);
        }
        Ok(results)
    }

    /// One external call; timing covers only the call itself
    async fn call(&self, request: CompletionRequest, action: &str)
      -> Result<(String, f64, Option<u32>), Error>
    {   let started = Instant::now();
        let completion = self.backend.complete(request).await
          .map_err(|e| {
            error!("Error trying to {}: {}", action, e);
            Error::CompletionFailed(
              format!("Failed to {}: {}", action, e)
            )
          })?;
        let elapsed = started.elapsed().as_secs_f64();
        Ok((completion.content, elapsed, completion.total_tokens))
    }
}

fn completion_request(
  messages: RenderedMessages
, temperature: f32
, max_tokens: u32
) -> CompletionRequest
{   CompletionRequest
    {   messages: vec![
          ChatMessage::system(messages.system)
        , ChatMessage::user(messages.user)
        ]
      , temperature: Some(temperature)
      , max_tokens: Some(max_tokens.min(MAX_TOKENS_CEILING))
      , top_p: Some(TOP_P)
    }
}

fn check_batch(got: usize, limit: usize) -> Result<(), Error>
{   if got > limit
    {   error!("Batch of {} exceeds limit {}", got, limit);
        return Err(Error::BatchTooLarge { limit, got });
    }
    Ok(())
}

/// Strip one level of matching straight quotes wrapping the whole text.
/// An escaped closing quote (`\"`) does not count as a wrapper.
pub fn strip_wrapping_quotes(text: &str) -> &str
{   for quote in ['"', '\'']
    {   if text.len() >= 2
          && text.starts_with(quote)
          && text.ends_with(quote)
        {   let inner = &text[1..text.len() - 1];
            if inner.ends_with('\\')
            {   return text;
            }
            return inner;
        }
    }
    text
}

#[cfg(test)]
mod tests
{   use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;
    use tokio_test::{assert_err, assert_ok};
    use crate::providers::Completion;

    /// Records every request and answers with a fixed reply
    struct RecordingBackend
    {   reply: Result<String, Error>
      , tokens: Option<u32>
      , seen: Mutex<Vec<CompletionRequest>>
    }

    impl RecordingBackend
    {   fn replying(text: &str) -> Arc<Self>
        {   Arc::new(RecordingBackend
            {   reply: Ok(text.to_string())
              , tokens: Some(42)
              , seen: Mutex::new(vec![])
            })
        }

        fn failing(err: Error) -> Arc<Self>
        {   Arc::new(RecordingBackend
            {   reply: Err(err)
              , tokens: None
              , seen: Mutex::new(vec![])
            })
        }

        fn calls(&self) -> usize
        {   self.seen.lock().unwrap().len()
        }

        fn last(&self) -> CompletionRequest
        {   self.seen.lock().unwrap().last().cloned().unwrap()
        }
    }

    #[async_trait]
    impl CompletionBackend for RecordingBackend
    {   async fn complete(&self, request: CompletionRequest)
          -> Result<Completion, Error>
        {   self.seen.lock().unwrap().push(request);
            self.reply.clone().map(|content| Completion
            {   content
              , total_tokens: self.tokens
            })
        }

        fn model(&self) -> &str
        {   "fake-model"
        }
    }

    fn orchestrator(backend: Arc<RecordingBackend>) -> Orchestrator
    {   Orchestrator::new(Arc::new(TemplateRegistry::builtin()), backend)
    }

    #[tokio::test]
    async fn each_style_sends_its_own_temperature()
    {   let registry = TemplateRegistry::builtin();
        for style in Style::ALL
        {   let backend = RecordingBackend::replying("done");
            let orch = orchestrator(backend.clone());
            assert_ok!(
              orch.rephrase("some text", style, Overrides::default()).await
            );

            let sent = backend.last();
            let expected = registry.resolve_style(style).unwrap().temperature;
            assert_eq!(sent.temperature, Some(expected));
            assert_eq!(sent.max_tokens, Some(1000));
            assert_eq!(sent.top_p, Some(1.0));
            assert_eq!(sent.messages.len(), 2);
            assert_eq!(sent.messages[0].role, "system");
            assert_eq!(sent.messages[1].role, "user");
        }
    }

    #[tokio::test]
    async fn overrides_win_over_template()
    {   let backend = RecordingBackend::replying("done");
        let orch = orchestrator(backend.clone());
        let overrides = Overrides
        {   temperature: Some(1.3)
          , max_tokens: Some(300)
        };
        assert_ok!(orch.rephrase("x", Style::Formal, overrides).await);
        let sent = backend.last();
        assert_eq!(sent.temperature, Some(1.3));
        assert_eq!(sent.max_tokens, Some(300));
    }

    #[tokio::test]
    async fn blank_text_is_rejected_for_every_style()
    {   let backend = RecordingBackend::replying("done");
        let orch = orchestrator(backend.clone());
        for style in Style::ALL
        {   let err = orch.rephrase("  ", style, Overrides::default())
              .await
              .unwrap_err();
            assert_eq!(err, Error::EmptyInput("Text".to_string()));
        }
        assert_eq!(backend.calls(), 0);
    }

    #[tokio::test]
    async fn rephrase_strips_one_pair_of_wrapping_quotes()
    {   let backend = RecordingBackend::replying("  \"Hello there.\"\n");
        let orch = orchestrator(backend);
        let result = orch
          .rephrase("hi", Style::Casual, Overrides::default())
          .await
          .unwrap();
        assert_eq!(result.text, "Hello there.");
        assert_eq!(result.tokens_used, Some(42));
        assert_eq!(result.model, "fake-model");
        assert_eq!(result.selection, Selection::Rephrase(Style::Casual));
        assert!(result.processing_time >= 0.0);
    }

    #[test]
    fn quote_stripping_rules()
    {   assert_eq!(strip_wrapping_quotes("\"Hello there.\""), "Hello there.");
        assert_eq!(strip_wrapping_quotes("'single'"), "single");
        assert_eq!(
          strip_wrapping_quotes("\"He said \"hi\" to me\"")
        , "He said \"hi\" to me"
        );
        assert_eq!(strip_wrapping_quotes("'It's fine'"), "It's fine");
        assert_eq!(strip_wrapping_quotes("\"open only"), "\"open only");
        assert_eq!(strip_wrapping_quotes("\"mixed'"), "\"mixed'");
        assert_eq!(strip_wrapping_quotes("\""), "\"");
        assert_eq!(strip_wrapping_quotes("\"\""), "");
        assert_eq!(
          strip_wrapping_quotes("\"ends escaped\\\"")
        , "\"ends escaped\\\""
        );
    }

    #[test]
    fn only_one_quote_level_is_stripped()
    {   assert_eq!(strip_wrapping_quotes("\"\"Hello\"\""), "\"Hello\"");
        assert_eq!(strip_wrapping_quotes("''x''"), "'x'");
    }

    #[tokio::test]
    async fn multibyte_input_is_counted_by_chars()
    {   let _ = env_logger::builder().is_test(true).try_init();
        let backend = RecordingBackend::replying("«Grüße, wie geht's?»");
        let orch = orchestrator(backend.clone());
        let text = "héllo wörld, ça va?";
        let result = assert_ok!(
          orch.rephrase(text, Style::Formal, Overrides::default()).await
        );
        assert_eq!(result.text, "«Grüße, wie geht's?»");
        assert_ne!(text.len(), text.chars().count());
        assert_eq!(backend.calls(), 1);
    }

    #[tokio::test]
    async fn content_output_keeps_quotes()
    {   let backend = RecordingBackend::replying(" \"quoted\" ");
        let orch = orchestrator(backend);
        let result = orch
          .generate_content(
            "p", ContentType::New, Tone::Casual, Length::Short
          , None, Overrides::default()
          )
          .await
          .unwrap();
        assert_eq!(result.text, "\"quoted\"");
        assert_eq!(
          result.selection
        , Selection::Content
          {   kind: ContentType::New
            , tone: Tone::Casual
            , length: Length::Short
          }
        );
    }

    #[tokio::test]
    async fn continue_without_context_fails_before_calling()
    {   let backend = RecordingBackend::replying("more");
        let orch = orchestrator(backend.clone());
        let err = orch
          .generate_content(
            "keep going", ContentType::Continue, Tone::Creative
          , Length::Medium, None, Overrides::default()
          )
          .await
          .unwrap_err();
        assert_eq!(err, Error::MissingRequiredContext(ContentType::Continue));
        assert_eq!(backend.calls(), 0);

        assert_ok!(
          orch.generate_content(
            "keep going", ContentType::New, Tone::Creative
          , Length::Medium, None, Overrides::default()
          ).await
        );
        assert_eq!(backend.calls(), 1);
    }

    #[tokio::test]
    async fn blank_prompt_is_rejected()
    {   let orch = orchestrator(RecordingBackend::replying("x"));
        let err = orch
          .generate_content(
            "\t", ContentType::New, Tone::Casual, Length::Short
          , None, Overrides::default()
          )
          .await
          .unwrap_err();
        assert_eq!(err, Error::EmptyInput("Prompt".to_string()));
    }

    #[tokio::test]
    async fn max_tokens_is_clamped_to_ceiling()
    {   let backend = RecordingBackend::replying("x");
        let orch = orchestrator(backend.clone());
        let overrides = Overrides
        {   temperature: None
          , max_tokens: Some(5000)
        };
        assert_ok!(
          orch.generate_content(
            "p", ContentType::New, Tone::Academic, Length::Long
          , None, overrides
          ).await
        );
        assert_eq!(backend.last().max_tokens, Some(2000));

        assert_ok!(
          orch.rephrase("t", Style::Formal, overrides).await
        );
        assert_eq!(backend.last().max_tokens, Some(2000));
    }

    #[tokio::test]
    async fn content_defaults_come_from_template_and_guideline()
    {   let backend = RecordingBackend::replying("x");
        let orch = orchestrator(backend.clone());
        assert_ok!(
          orch.generate_content(
            "p", ContentType::Brainstorm, Tone::Persuasive, Length::Long
          , None, Overrides::default()
          ).await
        );
        let sent = backend.last();
        assert_eq!(sent.temperature, Some(0.95));
        assert_eq!(sent.max_tokens, Some(1200));
        assert!(sent.messages[0].content.ends_with(
          "Target length: 6+ detailed paragraphs with thorough exploration"
        ));
        assert!(sent.messages[1].content.contains(
          "20+ creative ideas organized in categories"
        ));
    }

    #[tokio::test]
    async fn backend_failure_becomes_completion_failed()
    {   let backend = RecordingBackend::failing(
          Error::ApiError("Groq error (401): bad key".to_string())
        );
        let orch = orchestrator(backend);
        let err = orch
          .rephrase("hello", Style::Formal, Overrides::default())
          .await
          .unwrap_err();
        match err
        {   Error::CompletionFailed(msg) => {
              assert!(msg.starts_with("Failed to rephrase text"));
              assert!(msg.contains("bad key"));
            }
          , other => panic!("unexpected error: {:?}", other)
        }
    }

    #[tokio::test]
    async fn oversized_batch_fails_before_any_call()
    {   let backend = RecordingBackend::replying("x");
        let orch = orchestrator(backend.clone());
        let items: Vec<RephraseRequest> = (0..11)
          .map(|i| RephraseRequest::new(format!("text {}", i), Style::Formal))
          .collect();
        assert_eq!(
          orch.rephrase_batch(&items).await.err()
        , Some(Error::BatchTooLarge { limit: 10, got: 11 })
        );
        assert_eq!(backend.calls(), 0);

        let results = orch.rephrase_batch(&items[..10]).await.unwrap();
        assert_eq!(results.len(), 10);
        assert!(results.iter().all(|r| r.is_ok()));
        assert_eq!(backend.calls(), 10);
    }

    #[tokio::test]
    async fn batch_isolates_item_failures()
    {   let backend = RecordingBackend::replying("x");
        let orch = orchestrator(backend.clone());
        let items = vec![
          ContentRequest::new("ok", ContentType::New)
        , ContentRequest::new("needs context", ContentType::Summarize)
        , ContentRequest::new(" ", ContentType::Outline)
        , ContentRequest::new("fine", ContentType::Expand)
            .with_context("existing text")
        ];
        let results = orch.generate_content_batch(&items).await.unwrap();
        assert_ok!(&results[0]);
        assert_eq!(
          results[1].as_ref().err()
        , Some(&Error::MissingRequiredContext(ContentType::Summarize))
        );
        assert_err!(&results[2]);
        assert_ok!(&results[3]);
        assert_eq!(backend.calls(), 2);

        let six: Vec<ContentRequest> = (0..6)
          .map(|_| ContentRequest::new("p", ContentType::New))
          .collect();
        assert!(matches!(
          orch.generate_content_batch(&six).await
        , Err(Error::BatchTooLarge { limit: 5, got: 6 })
        ));
    }

    #[tokio::test]
    async fn batch_items_are_range_checked()
    {   let backend = RecordingBackend::replying("x");
        let orch = orchestrator(backend.clone());
        let mut bad = RephraseRequest::new("t", Style::Formal);
        bad.temperature = Some(3.0);
        let results = orch
          .rephrase_batch(&[bad, RephraseRequest::new("t", Style::Formal)])
          .await
          .unwrap();
        assert!(matches!(results[0], Err(Error::InvalidRequest(_))));
        assert_ok!(&results[1]);
        assert_eq!(backend.calls(), 1);
    }
}
