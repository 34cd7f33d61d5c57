//! Interactive REPL for the Workbench MCP server.
//!
//! Launch with `workbench-mcp repl` to enter interactive mode. Commands are
//! sent as JSON-RPC requests through an in-process [`ProtocolHandler`], so
//! the console sees exactly what a connected client would.
//! Type `/help` for available commands, Tab for completion.

use std::sync::Arc;

use rustyline::completion::{Completer, Pair};
use rustyline::config::CompletionType;
use rustyline::error::ReadlineError;
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::validate::Validator;
use rustyline::{
    Cmd, ConditionalEventHandler, Config, Editor, Event, EventContext, EventHandler, Helper,
    KeyEvent, RepeatCount,
};
use serde_json::{json, Value};

use crate::context::SessionContext;
use crate::protocol::ProtocolHandler;
use crate::types::{MCP_VERSION, SERVER_VERSION};

/// Available REPL commands.
const COMMANDS: &[(&str, &str)] = &[
    ("/info", "Show server identity and session"),
    ("/tools", "List available MCP tools"),
    ("/resources", "List resources and templates"),
    ("/prompts", "List prompts"),
    ("/call", "Call a tool: /call <tool> [json arguments]"),
    ("/read", "Read a resource: /read <uri>"),
    ("/clear", "Clear the screen"),
    ("/help", "Show available commands"),
    ("/exit", "Quit the REPL"),
];

/// REPL helper for tab completion.
struct WorkbenchHelper {
    tool_names: Vec<String>,
    resource_uris: Vec<String>,
}

impl Completer for WorkbenchHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &rustyline::Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        let input = &line[..pos];

        let Some((cmd, args)) = input.split_once(' ') else {
            let matches: Vec<Pair> = COMMANDS
                .iter()
                .filter(|(cmd, _)| cmd.starts_with(input))
                .map(|(cmd, desc)| Pair {
                    display: format!("{cmd:<16} {desc}"),
                    replacement: format!("{cmd} "),
                })
                .collect();
            return Ok((0, matches));
        };

        let candidates = match cmd {
            "/call" => &self.tool_names,
            "/read" => &self.resource_uris,
            _ => return Ok((pos, Vec::new())),
        };
        if args.contains(' ') {
            return Ok((pos, Vec::new()));
        }

        let matches: Vec<Pair> = candidates
            .iter()
            .filter(|c| c.starts_with(args))
            .map(|c| Pair {
                display: c.clone(),
                replacement: format!("{c} "),
            })
            .collect();
        Ok((input.len() - args.len(), matches))
    }
}

impl Hinter for WorkbenchHelper {
    type Hint = String;

    fn hint(&self, line: &str, pos: usize, _ctx: &rustyline::Context<'_>) -> Option<String> {
        if pos < line.len() || line.is_empty() {
            return None;
        }
        if line.starts_with('/') && !line.contains(' ') {
            for (cmd, _) in COMMANDS {
                if cmd.starts_with(line) && *cmd != line {
                    return Some(cmd[line.len()..].to_string());
                }
            }
        }
        None
    }
}

impl Highlighter for WorkbenchHelper {}
impl Validator for WorkbenchHelper {}
impl Helper for WorkbenchHelper {}

struct TabCompleteOrAcceptHint;

impl ConditionalEventHandler for TabCompleteOrAcceptHint {
    fn handle(
        &self,
        _evt: &Event,
        _n: RepeatCount,
        _positive: bool,
        ctx: &EventContext<'_>,
    ) -> Option<Cmd> {
        if ctx.has_hint() {
            Some(Cmd::CompleteHint)
        } else {
            Some(Cmd::Complete)
        }
    }
}

/// Console-side client state: one session, monotonically numbered requests.
struct ReplClient {
    handler: Arc<ProtocolHandler>,
    ctx: SessionContext,
    next_id: i64,
}

impl ReplClient {
    async fn connect(handler: Arc<ProtocolHandler>) -> anyhow::Result<Self> {
        let mut client = Self {
            handler,
            ctx: SessionContext::default(),
            next_id: 1,
        };
        let (result, session) = client
            .send(
                "initialize",
                json!({
                    "protocolVersion": MCP_VERSION,
                    "capabilities": {},
                    "clientInfo": {"name": "workbench-repl", "version": SERVER_VERSION},
                }),
            )
            .await;
        let session = session
            .ok_or_else(|| anyhow::anyhow!("initialize failed: {}", render(&result)))?;
        client.ctx.session_id = Some(session);
        client.notify("notifications/initialized").await;
        Ok(client)
    }

    /// Send one request; returns the `result` or `error` member.
    async fn send(&mut self, method: &str, params: Value) -> (Value, Option<String>) {
        let id = self.next_id;
        self.next_id += 1;
        let envelope = json!({"jsonrpc": "2.0", "id": id, "method": method, "params": params});
        let reply = self.handler.handle_value(envelope, &self.ctx).await;
        let body = reply.body.unwrap_or(Value::Null);
        let payload = body
            .get("result")
            .or_else(|| body.get("error"))
            .cloned()
            .unwrap_or(body);
        (payload, reply.session)
    }

    async fn notify(&self, method: &str) {
        let envelope = json!({"jsonrpc": "2.0", "method": method});
        self.handler.handle_value(envelope, &self.ctx).await;
    }
}

fn render(value: &Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}

fn print_block(text: &str) {
    eprintln!();
    for line in text.lines() {
        eprintln!("  {line}");
    }
    eprintln!();
}

/// Run the interactive REPL.
pub async fn run(handler: Arc<ProtocolHandler>) -> anyhow::Result<()> {
    eprintln!();
    eprintln!(
        "  \x1b[32m\u{25c9}\x1b[0m \x1b[1mworkbench-mcp v{}\x1b[0m \x1b[90m: tools, resources and prompts over MCP\x1b[0m",
        env!("CARGO_PKG_VERSION")
    );
    eprintln!();
    eprintln!(
        "    Press \x1b[36m/\x1b[0m to browse commands, \x1b[90mTab\x1b[0m to complete, \x1b[90m/exit\x1b[0m to quit."
    );
    eprintln!();

    let mut client = ReplClient::connect(handler.clone()).await?;

    let config = Config::builder()
        .history_ignore_space(true)
        .auto_add_history(true)
        .completion_type(CompletionType::List)
        .completion_prompt_limit(20)
        .build();

    let helper = WorkbenchHelper {
        tool_names: handler
            .tools()
            .list_tools()
            .into_iter()
            .map(|t| t.name)
            .collect(),
        resource_uris: handler
            .resources()
            .list_resources()
            .into_iter()
            .map(|r| r.uri)
            .collect(),
    };

    let mut rl: Editor<WorkbenchHelper, rustyline::history::DefaultHistory> =
        Editor::with_config(config)?;
    rl.set_helper(Some(helper));
    rl.bind_sequence(
        KeyEvent::from('\t'),
        EventHandler::Conditional(Box::new(TabCompleteOrAcceptHint)),
    );

    let home = std::env::var("HOME")
        .or_else(|_| std::env::var("USERPROFILE"))
        .unwrap_or_else(|_| ".".to_string());
    let hist_path = std::path::PathBuf::from(&home).join(".workbench_mcp_history");
    if hist_path.exists() {
        let _ = rl.load_history(&hist_path);
    }

    let prompt = " \x1b[36mworkbench>\x1b[0m ";

    loop {
        // Readline blocks; keep the runtime's other workers free meanwhile.
        match tokio::task::block_in_place(|| rl.readline(prompt)) {
            Ok(line) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }

                let input = line.strip_prefix('/').unwrap_or(line);
                if input.is_empty() {
                    cmd_help();
                    continue;
                }

                let (cmd, args) = input.split_once(' ').unwrap_or((input, ""));
                let args = args.trim();

                match cmd {
                    "exit" | "quit" => {
                        eprintln!("  \x1b[90m\u{2728}\x1b[0m Goodbye!");
                        break;
                    }
                    "help" | "h" | "?" => cmd_help(),
                    "clear" | "cls" => eprint!("\x1b[2J\x1b[H"),
                    "info" => cmd_info(&client),
                    "tools" => cmd_tools(&mut client).await,
                    "resources" => cmd_resources(&mut client).await,
                    "prompts" => cmd_prompts(&mut client).await,
                    "call" => cmd_call(&mut client, args).await,
                    "read" => cmd_read(&mut client, args).await,
                    _ => {
                        eprintln!("  Unknown command '/{cmd}'. Type /help for commands.");
                    }
                }
            }
            Err(ReadlineError::Interrupted) => {
                eprintln!("  \x1b[90m(Ctrl+C)\x1b[0m Type \x1b[1m/exit\x1b[0m to quit.");
            }
            Err(ReadlineError::Eof) => {
                eprintln!("  \x1b[90m\u{2728}\x1b[0m Goodbye!");
                break;
            }
            Err(err) => {
                eprintln!("  Error: {err}");
                break;
            }
        }
    }

    if let Some(session_id) = &client.ctx.session_id {
        handler.server().sessions.detach(session_id);
    }
    let _ = rl.save_history(&hist_path);

    Ok(())
}

fn cmd_help() {
    eprintln!();
    eprintln!("  Commands:");
    eprintln!();
    for (cmd, desc) in COMMANDS {
        eprintln!("    {cmd:<18} {desc}");
    }
    eprintln!();
    eprintln!("  Tip: Tab completes commands, tool names after /call and URIs after /read.");
    eprintln!();
}

fn cmd_info(client: &ReplClient) {
    let server = client.handler.server();
    eprintln!();
    eprintln!("  Server:   {} v{}", server.config.name, SERVER_VERSION);
    eprintln!("  Protocol: {MCP_VERSION}");
    eprintln!(
        "  Session:  {}",
        client.ctx.session_id.as_deref().unwrap_or("(none)")
    );
    eprintln!("  Tools:    {}", client.handler.tools().len());
    eprintln!();
}

async fn cmd_tools(client: &mut ReplClient) {
    let (result, _) = client.send("tools/list", json!({})).await;
    let tools = result["tools"].as_array().cloned().unwrap_or_default();
    eprintln!();
    eprintln!("  {} MCP tools available:", tools.len());
    eprintln!();
    for tool in &tools {
        eprintln!(
            "    {:<22} {}",
            tool["name"].as_str().unwrap_or(""),
            tool["description"].as_str().unwrap_or("")
        );
    }
    eprintln!();
}

async fn cmd_resources(client: &mut ReplClient) {
    let (resources, _) = client.send("resources/list", json!({})).await;
    let (templates, _) = client.send("resources/templates/list", json!({})).await;
    eprintln!();
    for resource in resources["resources"].as_array().into_iter().flatten() {
        eprintln!(
            "    {:<22} {}",
            resource["uri"].as_str().unwrap_or(""),
            resource["mimeType"].as_str().unwrap_or("")
        );
    }
    for template in templates["resourceTemplates"].as_array().into_iter().flatten() {
        eprintln!(
            "    {:<22} (template)",
            template["uriTemplate"].as_str().unwrap_or("")
        );
    }
    eprintln!();
}

async fn cmd_prompts(client: &mut ReplClient) {
    let (result, _) = client.send("prompts/list", json!({})).await;
    eprintln!();
    for prompt in result["prompts"].as_array().into_iter().flatten() {
        eprintln!(
            "    {:<22} {}",
            prompt["name"].as_str().unwrap_or(""),
            prompt["description"].as_str().unwrap_or("")
        );
    }
    eprintln!();
}

async fn cmd_call(client: &mut ReplClient, args: &str) {
    let (name, raw_args) = args.split_once(' ').unwrap_or((args, ""));
    if name.is_empty() {
        eprintln!("  Usage: /call <tool> [json arguments]");
        return;
    }

    let arguments = if raw_args.trim().is_empty() {
        json!({})
    } else {
        match serde_json::from_str::<Value>(raw_args) {
            Ok(v) => v,
            Err(e) => {
                eprintln!("  Invalid JSON arguments: {e}");
                return;
            }
        }
    };

    let (result, _) = client
        .send("tools/call", json!({"name": name, "arguments": arguments}))
        .await;
    match result["content"][0]["text"].as_str() {
        Some(text) if result["isError"] == json!(true) => eprintln!("  \x1b[31m{text}\x1b[0m"),
        Some(text) => print_block(text),
        None => print_block(&render(&result)),
    }
}

async fn cmd_read(client: &mut ReplClient, args: &str) {
    let uri = args.split_whitespace().next().unwrap_or("");
    if uri.is_empty() {
        eprintln!("  Usage: /read <uri>");
        return;
    }
    let (result, _) = client.send("resources/read", json!({"uri": uri})).await;
    match result["contents"][0]["text"].as_str() {
        Some(text) => print_block(text),
        None => print_block(&render(&result)),
    }
}
