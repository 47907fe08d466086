//! LLM gateway backed by an external command.
//!
//! Each request spawns the configured program, writes the prompt pair on
//! its stdin and streams its stdout back as [`StreamEvent::Delta`]s. A
//! non-zero exit is reported as [`StreamEvent::Error`] with the command's
//! stderr. The child is killed when the stream is dropped.

use super::error::CommandGatewayError;
use crate::config::{FileInputFormat, FileProviderConfig};
use async_trait::async_trait;
use checker_application::{GatewayError, LlmGateway, StreamHandle};
use checker_domain::{PromptPair, StreamEvent};
use std::process::Stdio;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWriteExt};
use tokio::process::{Child, Command};
use tokio::sync::mpsc;
use tracing::{debug, info, trace, warn};

const READ_BUFFER_SIZE: usize = 4096;
const EVENT_CHANNEL_SIZE: usize = 64;

/// LLM gateway that runs a provider command per request
#[derive(Debug, Clone)]
pub struct CommandLlmGateway {
    program: String,
    args: Vec<String>,
    model: String,
    input: FileInputFormat,
}

impl CommandLlmGateway {
    pub fn new(program: impl Into<String>) -> Self {
        let program = program.into();
        Self {
            model: program.clone(),
            program,
            args: Vec::new(),
            input: FileInputFormat::default(),
        }
    }

    /// Build the gateway from the `[provider]` section.
    pub fn from_config(config: &FileProviderConfig) -> Result<Self, CommandGatewayError> {
        let program = config.command().ok_or(CommandGatewayError::NoCommand)?;
        let mut gateway = Self::new(program)
            .with_args(config.args.clone())
            .with_input(config.input);
        if let Some(model) = config.model.as_deref().filter(|m| !m.trim().is_empty()) {
            gateway = gateway.with_model(model);
        }
        info!("Provider command: {} {:?}", gateway.program, gateway.args);
        Ok(gateway)
    }

    // ==================== Builder Methods ====================

    pub fn with_args(mut self, args: Vec<String>) -> Self {
        self.args = args;
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_input(mut self, input: FileInputFormat) -> Self {
        self.input = input;
        self
    }

    /// Bytes written to the command's stdin for `prompt`.
    fn stdin_payload(&self, prompt: &PromptPair) -> Result<Vec<u8>, CommandGatewayError> {
        let mut payload = match self.input {
            FileInputFormat::Text => format!("{}\n\n{}", prompt.system, prompt.user).into_bytes(),
            FileInputFormat::Json => serde_json::to_vec(&serde_json::json!({
                "model": self.model,
                "system": prompt.system,
                "user": prompt.user,
            }))?,
        };
        payload.push(b'\n');
        Ok(payload)
    }

    fn spawn(&self) -> Result<Child, CommandGatewayError> {
        debug!("Spawning provider command: {} {:?}", self.program, self.args);
        Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| CommandGatewayError::SpawnError {
                program: self.program.clone(),
                source,
            })
    }
}

#[async_trait]
impl LlmGateway for CommandLlmGateway {
    fn model_name(&self) -> &str {
        &self.model
    }

    async fn call(&self, prompt: &PromptPair) -> Result<String, GatewayError> {
        self.call_streaming(prompt).await?.collect_text().await
    }

    async fn call_streaming(&self, prompt: &PromptPair) -> Result<StreamHandle, GatewayError> {
        let payload = self.stdin_payload(prompt)?;
        let mut child = self.spawn()?;

        let mut stdin = child
            .stdin
            .take()
            .ok_or(CommandGatewayError::PipeUnavailable("stdin"))?;
        let stdout = child
            .stdout
            .take()
            .ok_or(CommandGatewayError::PipeUnavailable("stdout"))?;
        let stderr = child
            .stderr
            .take()
            .ok_or(CommandGatewayError::PipeUnavailable("stderr"))?;

        // Written concurrently so a chatty command cannot block on a full stdout pipe.
        tokio::spawn(async move {
            if let Err(e) = stdin.write_all(&payload).await {
                warn!("Could not write prompt to provider command: {}", e);
            }
            // Dropping stdin closes it; the command sees EOF.
        });

        let stderr_task = tokio::spawn(read_to_string(stderr));

        let (tx, rx) = mpsc::channel(EVENT_CHANNEL_SIZE);
        tokio::spawn(async move {
            let event = match pump_stdout(stdout, &tx).await {
                Ok(Some(text)) => {
                    let stderr = stderr_task.await.unwrap_or_default();
                    match finish(child, stderr).await {
                        Ok(()) => StreamEvent::Completed(text),
                        Err(e) => StreamEvent::Error(e.to_string()),
                    }
                }
                // Receiver is gone; dropping the child kills it.
                Ok(None) => return,
                Err(e) => StreamEvent::Error(e.to_string()),
            };
            let _ = tx.send(event).await;
        });

        Ok(StreamHandle::new(rx))
    }
}

/// Forward stdout as deltas. Returns the full text, or `None` once the
/// receiver has gone away.
async fn pump_stdout<R: AsyncRead + Unpin>(
    mut stdout: R,
    tx: &mpsc::Sender<StreamEvent>,
) -> Result<Option<String>, CommandGatewayError> {
    let mut buf = vec![0u8; READ_BUFFER_SIZE];
    let mut pending: Vec<u8> = Vec::new();
    let mut full_text = String::new();

    loop {
        let n = stdout.read(&mut buf).await?;
        if n == 0 {
            break;
        }
        pending.extend_from_slice(&buf[..n]);

        let chunk = take_utf8_prefix(&mut pending);
        if chunk.is_empty() {
            continue;
        }
        trace!("Provider delta: {} bytes", chunk.len());
        full_text.push_str(&chunk);
        if tx.send(StreamEvent::Delta(chunk)).await.is_err() {
            return Ok(None);
        }
    }

    if !pending.is_empty() {
        let rest = String::from_utf8_lossy(&pending).into_owned();
        full_text.push_str(&rest);
        if tx.send(StreamEvent::Delta(rest)).await.is_err() {
            return Ok(None);
        }
    }

    Ok(Some(full_text))
}

/// Remove and return the longest valid UTF-8 prefix of `pending`.
///
/// An incomplete multi-byte sequence at the end stays buffered; invalid
/// bytes in the middle are replaced.
fn take_utf8_prefix(pending: &mut Vec<u8>) -> String {
    let valid_up_to = match std::str::from_utf8(&pending[..]) {
        Ok(_) => pending.len(),
        Err(e) if e.error_len().is_none() => e.valid_up_to(),
        Err(_) => {
            let text = String::from_utf8_lossy(&pending[..]).into_owned();
            pending.clear();
            return text;
        }
    };
    let rest = pending.split_off(valid_up_to);
    let bytes = std::mem::replace(pending, rest);
    String::from_utf8_lossy(&bytes).into_owned()
}

async fn read_to_string<R: AsyncRead + Unpin>(mut reader: R) -> String {
    let mut bytes = Vec::new();
    if let Err(e) = reader.read_to_end(&mut bytes).await {
        debug!("Could not read provider stderr: {}", e);
    }
    String::from_utf8_lossy(&bytes).trim().to_string()
}

async fn finish(mut child: Child, stderr: String) -> Result<(), CommandGatewayError> {
    let status = child.wait().await?;
    if status.success() {
        debug!("Provider command finished");
        Ok(())
    } else {
        warn!("Provider command exited with {}", status);
        Err(CommandGatewayError::Exited {
            status: status.to_string(),
            stderr,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use checker_domain::ErrorKind;

    fn shell(script: &str) -> CommandLlmGateway {
        CommandLlmGateway::new("sh").with_args(vec!["-c".to_string(), script.to_string()])
    }

    #[tokio::test]
    async fn test_text_input_reaches_command() {
        let gateway = CommandLlmGateway::new("cat");
        let reply = gateway
            .call(&PromptPair::new("Be brief.", "Capital of France?"))
            .await
            .unwrap();
        assert_eq!(reply, "Be brief.\n\nCapital of France?\n");
    }

    #[tokio::test]
    async fn test_json_input_reaches_command() {
        let gateway = CommandLlmGateway::new("cat")
            .with_model("gpt-test")
            .with_input(FileInputFormat::Json);
        let reply = gateway
            .call(&PromptPair::new("sys", "user"))
            .await
            .unwrap();

        let value: serde_json::Value = serde_json::from_str(reply.trim()).unwrap();
        assert_eq!(value["model"], "gpt-test");
        assert_eq!(value["system"], "sys");
        assert_eq!(value["user"], "user");
    }

    #[tokio::test]
    async fn test_stdout_is_streamed_then_completed() {
        let gateway = shell(r#"cat > /dev/null; printf 'Some reasoning. '; sleep 0.1; printf '{"recommendation": "Good"}'"#);
        let mut handle = gateway
            .call_streaming(&PromptPair::new("sys", "user"))
            .await
            .unwrap();

        let mut deltas = String::new();
        let completed = loop {
            match handle.next_event().await {
                Some(StreamEvent::Delta(chunk)) => deltas.push_str(&chunk),
                Some(StreamEvent::Completed(text)) => break text,
                other => panic!("unexpected event: {:?}", other),
            }
        };
        assert_eq!(deltas, r#"Some reasoning. {"recommendation": "Good"}"#);
        assert_eq!(completed, deltas);
    }

    #[tokio::test]
    async fn test_failing_command_reports_stderr() {
        let gateway = shell("cat > /dev/null; echo 'quota exceeded' >&2; exit 3");
        let err = gateway
            .call(&PromptPair::new("sys", "user"))
            .await
            .unwrap_err();
        assert!(
            matches!(err, GatewayError::RequestFailed(ref msg) if msg.contains("quota exceeded"))
        );
    }

    #[tokio::test]
    async fn test_missing_program_is_connection_error() {
        let gateway = CommandLlmGateway::new("definitely-not-a-real-provider-command");
        let err = gateway
            .call_streaming(&PromptPair::new("sys", "user"))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ApiConnection);
    }

    #[test]
    fn test_from_config() {
        let config = FileProviderConfig {
            command: Some("llm".to_string()),
            args: vec!["-m".to_string(), "mini".to_string()],
            model: Some("mini".to_string()),
            input: FileInputFormat::Json,
        };
        let gateway = CommandLlmGateway::from_config(&config).unwrap();
        assert_eq!(gateway.model_name(), "mini");
        assert_eq!(gateway.args, vec!["-m", "mini"]);

        let err = CommandLlmGateway::from_config(&FileProviderConfig::default()).unwrap_err();
        assert!(matches!(err, CommandGatewayError::NoCommand));
    }

    #[test]
    fn test_model_name_defaults_to_program() {
        assert_eq!(CommandLlmGateway::new("llm").model_name(), "llm");
    }

    #[test]
    fn test_split_multibyte_char_is_held_back() {
        let bytes = "é".as_bytes();
        let mut pending = vec![b'a', bytes[0]];
        assert_eq!(take_utf8_prefix(&mut pending), "a");
        assert_eq!(pending, vec![bytes[0]]);

        pending.push(bytes[1]);
        assert_eq!(take_utf8_prefix(&mut pending), "é");
        assert!(pending.is_empty());
    }
}
