//! Interactive terminal mode
//!
//! Lines starting with `rephrase` or `generate` run a transformation;
//! anything else is a free-form chat turn with running history.

use std::sync::Arc;
use log::{debug, error};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use crate::client::Orchestrator;
use crate::error::Error;
use crate::providers::{ChatMessage, CompletionBackend, CompletionRequest};
use crate::request::Overrides;
use crate::{ContentType, Length, Style, Tone};

pub const SYSTEM_MESSAGE: &str
  = "You are a helpful assistant with rephrasing and content generation capabilities.";

/// One parsed input line
#[derive(Debug, Clone, PartialEq)]
pub enum Command
{   Exit
  , Rephrase
    {   style: Style
      , text: String
    }
  , Generate
    {   kind: ContentType
      , prompt: String
    }
  , Chat(String)
  , /// Malformed command; carries the help text to print
    Usage(String)
  , Empty
}

impl Command
{   pub fn parse(line: &str) -> Command
    {   let line = line.trim();
        if line.is_empty()
        {   return Command::Empty;
        }
        if line.eq_ignore_ascii_case("exit")
          || line.eq_ignore_ascii_case("quit")
        {   return Command::Exit;
        }

        if let Some(rest) = line.strip_prefix("rephrase ")
        {   return match split_word(rest)
            {   None => Command::Usage(format!(
                  "Usage: rephrase [style] [text]\nStyles: {}",
                  names(&Style::ALL)
                ))
              , Some((name, text)) => match name.parse::<Style>()
                {   Ok(style) => Command::Rephrase
                    {   style
                      , text: text.to_string()
                    }
                  , Err(_) => Command::Usage(format!(
                      "Invalid style. Available: {}",
                      names(&Style::ALL)
                    ))
                }
            };
        }

        if let Some(rest) = line.strip_prefix("generate ")
        {   return match split_word(rest)
            {   None => Command::Usage(format!(
                  "Usage: generate [type] [prompt]\nTypes: {}",
                  names(&ContentType::ALL)
                ))
              , Some((name, prompt)) => match name.parse::<ContentType>()
                {   Ok(kind) => Command::Generate
                    {   kind
                      , prompt: prompt.to_string()
                    }
                  , Err(_) => Command::Usage(format!(
                      "Invalid type. Available: {}",
                      names(&ContentType::ALL)
                    ))
                }
            };
        }

        Command::Chat(line.to_string())
    }
}

fn split_word(rest: &str) -> Option<(&str, &str)>
{   let (word, tail) = rest.trim_start().split_once(' ')?;
    let tail = tail.trim();
    if tail.is_empty()
    {   None
    } else
    {   Some((word, tail))
    }
}

fn names<T: std::fmt::Display>(values: &[T]) -> String
{   values
      .iter()
      .map(|v| v.to_string())
      .collect::<Vec<_>>()
      .join(", ")
}

/// Terminal session state: the orchestrator plus chat history
pub struct ChatSession
{   orchestrator: Orchestrator
  , backend: Arc<dyn CompletionBackend>
  , history: Vec<ChatMessage>
}

impl ChatSession
{   pub fn new(orchestrator: Orchestrator, backend: Arc<dyn CompletionBackend>)
      -> Self
    {   ChatSession
        {   orchestrator
          , backend
          , history: vec![ChatMessage::system(SYSTEM_MESSAGE)]
        }
    }

    pub fn history(&self) -> &[ChatMessage]
    {   &self.history
    }

    /// Run one command and return the text to print.
    /// `None` means the session should end.
    pub async fn handle(&mut self, command: Command) -> Option<String>
    {   match command
        {   Command::Exit => None
          , Command::Empty => Some(String::new())
          , Command::Usage(help) => Some(help)
          , Command::Rephrase { style, text } => {
              let reply = match self.orchestrator
                .rephrase(&text, style, Overrides::default())
                .await
              {   Ok(result) => format!(
                    "\nOriginal: {}\nRephrased ({}): {}\nProcessing time: {:.2}s\n",
                    text, style, result.text, result.processing_time
                  )
                , Err(e) => format!("Error rephrasing: {}\n", e)
              };
              Some(reply)
            }
          , Command::Generate { kind, prompt } => {
              let reply = match self.orchestrator
                .generate_content(
                  &prompt
                , kind
                , Tone::Professional
                , Length::Medium
                , None
                , Overrides::default()
                )
                .await
              {   Ok(result) => format!(
                    "\nPrompt: {}\nGenerated content ({}):\n{}\nProcessing time: {:.2}s\n",
                    prompt, kind, result.text, result.processing_time
                  )
                , Err(e) => format!("Error generating content: {}\n", e)
              };
              Some(reply)
            }
          , Command::Chat(text) => {
              let reply = match self.chat_turn(text).await
              {   Ok(answer) => format!("Groq: {}\n", answer)
                , Err(e) => format!("Error: {}\n", e)
              };
              Some(reply)
            }
        }
    }

    /// Free-form turn; the exchange is kept only if the call succeeds
    async fn chat_turn(&mut self, text: String) -> Result<String, Error>
    {   self.history.push(ChatMessage::user(text));
        let request = CompletionRequest
        {   messages: self.history.clone()
          , ..CompletionRequest::default()
        };

        match self.backend.complete(request).await
        {   Ok(completion) => {
              self.history.push(
                ChatMessage::assistant(completion.content.clone())
              );
              Ok(completion.content)
            }
          , Err(e) => {
              error!("Chat turn failed: {}", e);
              self.history.pop();
              Err(e)
            }
        }
    }

    /// Read commands from stdin until `exit`, `quit` or end of input
    pub async fn run(mut self) -> Result<(), Error>
    {   let mut stdout = tokio::io::stdout();
        let mut lines = BufReader::new(tokio::io::stdin()).lines();

        println!("Groq AI Assistant with Rephrase & Content Generation is ready!");
        println!("Commands:");
        println!("- 'exit' or 'quit': Exit the chat");
        println!("- 'rephrase [style] [text]': Rephrase text (styles: {})", names(&Style::ALL));
        println!("- 'generate [type] [prompt]': Generate content (types: {})", names(&ContentType::ALL));
        println!("- Just type normally for regular chat");
        println!();

        loop
        {   stdout.write_all(b"You: ").await?;
            stdout.flush().await?;

            let line = match lines.next_line().await?
            {   Some(line) => line
              , None => {
                  debug!("stdin closed");
                  break;
                }
            };

            match self.handle(Command::parse(&line)).await
            {   Some(reply) if reply.is_empty() => {}
              , Some(reply) => println!("{}", reply)
              , None => break
            }
        }

        println!("Goodbye!");
        Ok(())
    }
}

#[cfg(test)]
mod tests
{   use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;
    use crate::providers::Completion;
    use crate::registry::TemplateRegistry;

    struct EchoBackend
    {   seen: Mutex<Vec<CompletionRequest>>
      , fail: bool
    }

    #[async_trait]
    impl CompletionBackend for EchoBackend
    {   async fn complete(&self, request: CompletionRequest)
          -> Result<Completion, Error>
        {   let last = request.messages.last()
              .map(|m| m.content.clone())
              .unwrap_or_default();
            self.seen.lock().unwrap().push(request);
            if self.fail
            {   return Err(Error::Timeout);
            }
            Ok(Completion
            {   content: format!("echo: {}", last)
              , total_tokens: None
            })
        }

        fn model(&self) -> &str
        {   "echo"
        }
    }

    fn session(fail: bool) -> (ChatSession, Arc<EchoBackend>)
    {   let backend = Arc::new(EchoBackend
        {   seen: Mutex::new(vec![])
          , fail
        });
        let orchestrator = Orchestrator::new(
          Arc::new(TemplateRegistry::builtin())
        , backend.clone()
        );
        (ChatSession::new(orchestrator, backend.clone()), backend)
    }

    #[test]
    fn parses_commands()
    {   assert_eq!(Command::parse("  QUIT "), Command::Exit);
        assert_eq!(Command::parse(""), Command::Empty);
        assert_eq!(
          Command::parse("rephrase casual I would like to request a meeting")
        , Command::Rephrase
          {   style: Style::Casual
            , text: "I would like to request a meeting".to_string()
          }
        );
        assert_eq!(
          Command::parse("generate outline a talk on lifetimes")
        , Command::Generate
          {   kind: ContentType::Outline
            , prompt: "a talk on lifetimes".to_string()
          }
        );
        assert_eq!(
          Command::parse("what is a trait?")
        , Command::Chat("what is a trait?".to_string())
        );
    }

    #[test]
    fn malformed_commands_print_help()
    {   match Command::parse("rephrase formal")
        {   Command::Usage(help) => assert!(help.starts_with("Usage: rephrase")),
            other => panic!("unexpected: {:?}", other)
        }
        match Command::parse("rephrase shouty hello")
        {   Command::Usage(help) => {
              assert!(help.contains("formal, casual, creative, concise"))
            }
            other => panic!("unexpected: {:?}", other)
        }
        match Command::parse("generate poem roses")
        {   Command::Usage(help) => assert!(help.starts_with("Invalid type")),
            other => panic!("unexpected: {:?}", other)
        }
    }

    #[tokio::test]
    async fn chat_keeps_history_without_overrides()
    {   let (mut session, backend) = session(false);
        let reply = session.handle(Command::Chat("hi".into())).await;
        assert_eq!(reply.as_deref(), Some("Groq: echo: hi\n"));
        assert_eq!(session.history().len(), 3);
        assert_eq!(session.history()[0].content, SYSTEM_MESSAGE);

        let sent = backend.seen.lock().unwrap()[0].clone();
        assert_eq!(sent.temperature, None);
        assert_eq!(sent.max_tokens, None);
        assert_eq!(sent.top_p, None);
    }

    #[tokio::test]
    async fn failed_chat_turn_is_dropped_from_history()
    {   let (mut session, _backend) = session(true);
        let reply = session.handle(Command::Chat("hi".into())).await
          .unwrap();
        assert!(reply.starts_with("Error: Request timed out"));
        assert_eq!(session.history().len(), 1);
    }

    #[tokio::test]
    async fn transformations_do_not_touch_history()
    {   let (mut session, backend) = session(false);
        let reply = session
          .handle(Command::parse("rephrase concise at this point in time"))
          .await
          .unwrap();
        assert!(reply.contains("Rephrased (concise):"));

        let reply = session
          .handle(Command::parse("generate summarize the meeting"))
          .await
          .unwrap();
        assert!(reply.starts_with("Error generating content: Context is required"));

        assert_eq!(session.history().len(), 1);
        assert_eq!(backend.seen.lock().unwrap().len(), 1);
        assert_eq!(session.handle(Command::Exit).await, None);
    }
}
