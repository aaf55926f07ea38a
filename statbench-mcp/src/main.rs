//! statbench MCP Server
//!
//! Line-delimited JSON-RPC 2.0 on stdin/stdout. Logs go to stderr.
//!
//! Tools:
//! - run_analysis: Run one analysis and return its tables
//! - run_batch: Run several analyses concurrently
//! - list_analyses: List available analyses
//! - help: Documentation for an analysis, or general help

use serde::{Deserialize, Serialize};
use serde_json::{json, Value as JsonValue};
use statbench::{render, AnalysisRequest, EngineConfig, Job, Statbench, Workbench};
use statbench_core::{ResultTable, StatError};
use std::env;
use tokio::io::{self, AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::{debug, error, info, warn, Level};

const PROTOCOL_VERSION: &str = "2025-11-25";
const SERVER_NAME: &str = "statbench";
const SERVER_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Log level, e.g. "debug"
const LOG_ENV: &str = "STATBENCH_LOG";

const PARSE_ERROR: i32 = -32700;
const METHOD_NOT_FOUND: i32 = -32601;
const INVALID_PARAMS: i32 = -32602;

// MCP Protocol types
#[derive(Debug, Deserialize)]
struct McpRequest {
    #[allow(dead_code)]
    jsonrpc: String,
    id: Option<JsonValue>,
    method: String,
    #[serde(default)]
    params: Option<JsonValue>,
}

#[derive(Debug, Serialize)]
struct McpResponse {
    jsonrpc: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    id: Option<JsonValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    result: Option<JsonValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<McpError>,
}

impl McpResponse {
    fn success(id: Option<JsonValue>, result: JsonValue) -> Self {
        Self { jsonrpc: "2.0".to_string(), id, result: Some(result), error: None }
    }

    fn failure(id: Option<JsonValue>, error: McpError) -> Self {
        Self { jsonrpc: "2.0".to_string(), id, result: None, error: Some(error) }
    }
}

#[derive(Debug, Serialize)]
struct McpError {
    code: i32,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<JsonValue>,
}

impl McpError {
    fn invalid_params(message: impl Into<String>) -> Self {
        Self { code: INVALID_PARAMS, message: message.into(), data: None }
    }

    /// Bad params carrying the structured engine error
    fn from_stat(err: &StatError) -> Self {
        Self {
            code: INVALID_PARAMS,
            message: err.message.clone(),
            data: serde_json::to_value(err).ok(),
        }
    }
}

struct Server {
    engine: Statbench,
    workbench: Workbench,
}

fn init_logging() {
    let level = env::var(LOG_ENV)
        .ok()
        .and_then(|v| v.parse::<Level>().ok())
        .unwrap_or(Level::INFO);
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() {
    init_logging();

    let config = match EngineConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!(code = %e.code, "{}", e.message);
            std::process::exit(1);
        }
    };

    let engine = Statbench::with_standard_library().with_config(config);
    let workbench = engine.workbench();
    let server = Server { engine, workbench };

    info!(version = SERVER_VERSION, protocol = PROTOCOL_VERSION, "statbench MCP server started");
    info!(
        analyses = server.engine.list_analyses().len(),
        workers = server.engine.config().workers,
        "server ready, waiting for requests"
    );

    let mut lines = BufReader::new(io::stdin()).lines();
    let mut stdout = io::stdout();

    loop {
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => {
                info!("client disconnected (EOF)");
                break;
            }
            Err(e) => {
                error!(error = %e, "error reading input");
                break;
            }
        };

        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        debug!(bytes = line.len(), "received");

        let request: McpRequest = match serde_json::from_str(line) {
            Ok(r) => r,
            Err(e) => {
                warn!(error = %e, "error parsing request");
                let response = McpResponse::failure(
                    None,
                    McpError { code: PARSE_ERROR, message: format!("Parse error: {}", e), data: None },
                );
                if write_response(&mut stdout, &response).await.is_err() {
                    break;
                }
                continue;
            }
        };

        debug!(method = %request.method, "processing");
        let response = server.handle_request(&request).await;

        // Notifications (no id) do not receive a response
        if request.id.is_none() {
            debug!(method = %request.method, "notification processed");
            continue;
        }

        if let Err(e) = write_response(&mut stdout, &response).await {
            error!(error = %e, "error writing response");
            break;
        }
    }

    info!("server shutting down");
}

async fn write_response(stdout: &mut io::Stdout, response: &McpResponse) -> std::io::Result<()> {
    let json = serde_json::to_string(response).unwrap_or_else(|e| {
        json!({
            "jsonrpc": "2.0",
            "id": response.id,
            "error": { "code": -32603, "message": format!("Response serialization failed: {}", e) }
        })
        .to_string()
    });
    stdout.write_all(json.as_bytes()).await?;
    stdout.write_all(b"\n").await?;
    stdout.flush().await
}

impl Server {
    async fn handle_request(&self, request: &McpRequest) -> McpResponse {
        let result = match request.method.as_str() {
            // Lifecycle
            "initialize" => handle_initialize(&request.params),
            "initialized" | "notifications/initialized" => Ok(json!({})),
            "ping" => Ok(json!({})),

            // Tools
            "tools/list" => Ok(tools_list()),
            "tools/call" => self.handle_tool_call(&request.params).await,

            _ => Err(McpError {
                code: METHOD_NOT_FOUND,
                message: format!("Method not found: {}", request.method),
                data: None,
            }),
        };

        match result {
            Ok(r) => McpResponse::success(request.id.clone(), r),
            Err(e) => McpResponse::failure(request.id.clone(), e),
        }
    }

    async fn handle_tool_call(&self, params: &Option<JsonValue>) -> Result<JsonValue, McpError> {
        let params = params.as_ref().ok_or_else(|| McpError::invalid_params("Missing params"))?;
        let name = params
            .get("name")
            .and_then(|v| v.as_str())
            .ok_or_else(|| McpError::invalid_params("Missing tool name"))?;
        let args = params.get("arguments").cloned().unwrap_or_else(|| json!({}));

        match name {
            "run_analysis" => self.tool_run_analysis(args).await,
            "run_batch" => self.tool_run_batch(args).await,
            "list_analyses" => self.tool_list_analyses(),
            "help" => self.tool_help(args),
            _ => Err(McpError::invalid_params(format!("Unknown tool: {}", name))),
        }
    }

    async fn tool_run_analysis(&self, args: JsonValue) -> Result<JsonValue, McpError> {
        let analysis = args
            .get("analysis")
            .and_then(|v| v.as_str())
            .ok_or_else(|| McpError::invalid_params("Missing analysis argument"))?
            .to_string();
        let request: AnalysisRequest = match args.get("request") {
            Some(r) => serde_json::from_value(r.clone())
                .map_err(|e| McpError::invalid_params(format!("Invalid request: {}", e)))?,
            None => AnalysisRequest::new(),
        };

        let tables = self.workbench.run(Job::new(analysis, request)).await;
        Ok(tables_result(&tables))
    }

    async fn tool_run_batch(&self, args: JsonValue) -> Result<JsonValue, McpError> {
        let jobs = args
            .get("jobs")
            .cloned()
            .ok_or_else(|| McpError::invalid_params("Missing jobs argument"))?;
        let jobs: Vec<Job> =
            serde_json::from_value(jobs).map_err(|e| McpError::invalid_params(format!("Invalid jobs: {}", e)))?;
        info!(jobs = jobs.len(), "batch received");

        let results = self.workbench.run_batch(jobs).await;
        let text = results
            .iter()
            .enumerate()
            .map(|(i, tables)| format!("## Job {}\n\n{}", i + 1, render::render_all(tables)))
            .collect::<Vec<_>>()
            .join("\n");
        let is_error = results.iter().flatten().any(ResultTable::is_error);

        Ok(json!({
            "content": [{ "type": "text", "text": text }],
            "results": results,
            "isError": is_error
        }))
    }

    fn tool_list_analyses(&self) -> Result<JsonValue, McpError> {
        let analyses: Vec<JsonValue> = self
            .engine
            .list_analyses()
            .iter()
            .map(|m| json!({ "name": m.name, "title": m.title, "category": m.category, "description": m.description }))
            .collect();
        let text = analyses
            .iter()
            .map(|a| format!("- **{}**: {}", a["name"].as_str().unwrap_or_default(), a["description"].as_str().unwrap_or_default()))
            .collect::<Vec<_>>()
            .join("\n");
        Ok(json!({
            "content": [{ "type": "text", "text": text }],
            "analyses": analyses
        }))
    }

    fn tool_help(&self, args: JsonValue) -> Result<JsonValue, McpError> {
        let name = args.get("name").and_then(|v| v.as_str());
        let help = self.engine.help(name).map_err(|e| McpError::from_stat(&e))?;
        let text = serde_json::to_string_pretty(&help).unwrap_or_else(|_| help.to_string());
        Ok(json!({
            "content": [{ "type": "text", "text": text }],
            "help": help
        }))
    }
}

fn tables_result(tables: &[ResultTable]) -> JsonValue {
    json!({
        "content": [{ "type": "text", "text": render::render_all(tables) }],
        "tables": tables,
        "isError": tables.iter().any(ResultTable::is_error)
    })
}

fn handle_initialize(params: &Option<JsonValue>) -> Result<JsonValue, McpError> {
    let client_info = params
        .as_ref()
        .and_then(|p| p.get("clientInfo"))
        .and_then(|c| c.get("name"))
        .and_then(|n| n.as_str())
        .unwrap_or("unknown");

    // Use client's protocol version for compatibility
    let client_protocol = params
        .as_ref()
        .and_then(|p| p.get("protocolVersion"))
        .and_then(|v| v.as_str())
        .unwrap_or(PROTOCOL_VERSION);

    info!(client = client_info, protocol = client_protocol, "client connected");

    Ok(json!({
        "protocolVersion": client_protocol,
        "serverInfo": {
            "name": SERVER_NAME,
            "version": SERVER_VERSION,
            "description": "Regression, curve estimation, descriptives and frequencies over named samples"
        },
        "capabilities": {
            "tools": {
                "listChanged": false
            }
        },
        "instructions": "Use list_analyses to see what is available and help with an analysis name for its request fields. Results come back as markdown tables plus structured JSON."
    }))
}

fn sample_schema() -> JsonValue {
    json!({
        "type": "object",
        "properties": {
            "name": { "type": "string" },
            "values": {
                "type": "array",
                "items": { "type": ["number", "string", "null"] },
                "description": "Observations; null and unparseable strings are missing"
            }
        },
        "required": ["name", "values"]
    })
}

fn request_schema() -> JsonValue {
    json!({
        "type": "object",
        "properties": {
            "dependent": sample_schema(),
            "independents": { "type": "array", "items": sample_schema() },
            "variables": { "type": "array", "items": sample_schema() },
            "models": {
                "type": "array",
                "items": { "type": "string" },
                "description": "Curve models (default: all)"
            },
            "options": {
                "type": "object",
                "properties": {
                    "durbin_watson": { "type": "boolean" },
                    "collinearity": { "type": "boolean" },
                    "percentiles": { "type": "array", "items": { "type": "number" } },
                    "frequency_order": { "type": "string", "enum": ["first_seen", "ascending"] }
                }
            }
        }
    })
}

fn tools_list() -> JsonValue {
    json!({
        "tools": [
            {
                "name": "run_analysis",
                "description": "Run one analysis (regression, curve_estimation, descriptives, frequencies) and return its result tables.",
                "inputSchema": {
                    "type": "object",
                    "properties": {
                        "analysis": {
                            "type": "string",
                            "description": "Analysis name"
                        },
                        "request": request_schema()
                    },
                    "required": ["analysis", "request"]
                }
            },
            {
                "name": "run_batch",
                "description": "Run several analyses concurrently. Results keep the order of jobs.",
                "inputSchema": {
                    "type": "object",
                    "properties": {
                        "jobs": {
                            "type": "array",
                            "items": {
                                "type": "object",
                                "properties": {
                                    "analysis": { "type": "string" },
                                    "request": request_schema()
                                },
                                "required": ["analysis"]
                            }
                        }
                    },
                    "required": ["jobs"]
                }
            },
            {
                "name": "list_analyses",
                "description": "List available analyses.",
                "inputSchema": {
                    "type": "object",
                    "properties": {}
                }
            },
            {
                "name": "help",
                "description": "Documentation for an analysis, or general help when name is omitted.",
                "inputSchema": {
                    "type": "object",
                    "properties": {
                        "name": {
                            "type": "string",
                            "description": "Analysis name. Omit for general help."
                        }
                    }
                }
            }
        ]
    })
}
