//! `sitekv` CLI — command-line client for the `sitekv` record service.
//!
//! A standalone HTTP client that talks to a running server over its JSON
//! API. It has no internal crate dependencies.

#![allow(clippy::print_stdout, clippy::print_stderr)]

use std::process::ExitCode;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use serde::Deserialize;
use serde_json::{Value, json};

// ── ANSI color helpers ───────────────────────────────────────────────

const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";
const DIM: &str = "\x1b[2m";
const RED: &str = "\x1b[31m";
const GREEN: &str = "\x1b[32m";
const YELLOW: &str = "\x1b[33m";
const CYAN: &str = "\x1b[36m";
const WHITE: &str = "\x1b[37m";

const BANNER_SMALL: &str = "◆ sitekv";

// ── CLI structure ────────────────────────────────────────────────────

/// sitekv — tenant-scoped site content over HTTP.
#[derive(Parser)]
#[command(
    name = "sitekv",
    version,
    about = "sitekv CLI — read and write pages, products, navigation, and footers",
    long_about = None,
    after_help = format!(
        "{DIM}Environment variables:{RESET}\n  \
         SITEKV_ADDR     Server address (default: http://127.0.0.1:8787)\n  \
         SITEKV_TENANT   Tenant (website) id\n\n\
         {DIM}Examples:{RESET}\n  \
         sitekv status\n  \
         sitekv --tenant site1 page put about '{{\"title\":\"About\"}}'\n  \
         sitekv --tenant site1 nav set @nav.json\n  \
         sitekv bundle site1:page:about --nav site1:navigation --footer site1:footer"
    ),
)]
struct Cli {
    /// sitekv server address.
    #[arg(long, env = "SITEKV_ADDR", default_value = "http://127.0.0.1:8787")]
    addr: String,

    /// Tenant (website) id that scopes every record.
    #[arg(long, short = 't', env = "SITEKV_TENANT", global = true)]
    tenant: Option<String>,

    /// Print raw JSON instead of formatted output.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check that the server is reachable.
    Status,
    /// Page operations.
    Page {
        #[command(subcommand)]
        action: RecordCommands,
    },
    /// Product operations.
    Product {
        #[command(subcommand)]
        action: RecordCommands,
    },
    /// Site navigation (one per tenant).
    Nav {
        #[command(subcommand)]
        action: SingletonCommands,
    },
    /// Site footer (one per tenant).
    Footer {
        #[command(subcommand)]
        action: SingletonCommands,
    },
    /// Fetch a page with navigation and footer in one request.
    Bundle {
        /// Full page key (e.g., "site1:page:about").
        page_key: String,
        /// Full navigation key.
        #[arg(long)]
        nav: Option<String>,
        /// Full footer key.
        #[arg(long)]
        footer: Option<String>,
    },
}

#[derive(Subcommand)]
enum RecordCommands {
    /// Read a record. Without a tenant, ID must be a full key.
    Get {
        /// Record id (slug or full key).
        id: String,
    },
    /// Create or replace a record.
    Put {
        /// Record id.
        id: String,
        /// JSON document, or @path to read it from a file.
        document: String,
    },
    /// Delete a record.
    Delete {
        /// Record id.
        id: String,
    },
    /// List every record for the tenant.
    List,
}

#[derive(Subcommand)]
enum SingletonCommands {
    /// Read the tenant's document.
    Get,
    /// Replace the tenant's document.
    Set {
        /// JSON document, or @path to read it from a file.
        document: String,
    },
}

/// Which identified collection a record command targets.
#[derive(Clone, Copy)]
enum Collection {
    Pages,
    Products,
}

impl Collection {
    fn base(self) -> &'static str {
        match self {
            Self::Pages => "/api/pages",
            Self::Products => "/api/products",
        }
    }

    fn label(self) -> &'static str {
        match self {
            Self::Pages => "Page",
            Self::Products => "Product",
        }
    }
}

#[derive(Clone, Copy)]
enum Singleton {
    Navigation,
    Footer,
}

impl Singleton {
    fn base(self) -> &'static str {
        match self {
            Self::Navigation => "/api/navigation",
            Self::Footer => "/api/footer",
        }
    }

    fn label(self) -> &'static str {
        match self {
            Self::Navigation => "Navigation",
            Self::Footer => "Footer",
        }
    }
}

/// One entry of a list response.
#[derive(Deserialize)]
struct ListedRecord {
    key: String,
    value: String,
}

// ── Pretty output helpers ────────────────────────────────────────────

fn header(icon: &str, title: &str) {
    println!("{BOLD}{CYAN}{icon} {title}{RESET}");
    println!("{DIM}─────────────────────────────────────────{RESET}");
}

fn kv_line(key: &str, value: &str) {
    println!("  {DIM}{key:<20}{RESET} {WHITE}{value}{RESET}");
}

fn success(msg: &str) {
    println!("{GREEN}{BOLD}✓{RESET} {msg}");
}

fn warning(msg: &str) {
    println!("{YELLOW}{BOLD}⚠{RESET} {YELLOW}{msg}{RESET}");
}

fn print_json(value: &Value) {
    match serde_json::to_string_pretty(value) {
        Ok(s) => println!("{s}"),
        Err(_) => println!("{value}"),
    }
}

fn print_document(title: &str, doc: &Value) {
    header("📄", title);
    if let Some(obj) = doc.as_object() {
        for (k, v) in obj {
            let display = match v {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            kv_line(k, &display);
        }
    } else {
        print_json(doc);
    }
    println!();
}

fn print_listing(title: &str, records: &[ListedRecord]) {
    header("📂", title);
    if records.is_empty() {
        println!("  {DIM}(empty){RESET}");
    }
    for record in records {
        let size = record.value.len();
        println!("  {CYAN}├─{RESET} {}  {DIM}{size} bytes{RESET}", record.key);
    }
    println!();
}

// ── Input helpers ────────────────────────────────────────────────────

/// Parse a document argument: inline JSON, or `@path` to a JSON file.
fn read_document(arg: &str) -> Result<Value> {
    let (source, text) = match arg.strip_prefix('@') {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read document file: {path}"))?;
            (path, text)
        }
        None => ("argument", arg.to_owned()),
    };
    serde_json::from_str(&text).with_context(|| format!("document {source} is not valid JSON"))
}

/// Path segments the server routes as collection operations.
const RESERVED_IDS: [&str; 2] = ["all", "delete"];

/// Validate a record id and encode it as one path segment.
fn record_segment(id: &str) -> Result<String> {
    if id.trim().is_empty() || RESERVED_IDS.contains(&id) {
        bail!("'{id}' is reserved and cannot be used as a record id");
    }
    Ok(urlencoding::encode(id).into_owned())
}

fn require_tenant(tenant: Option<&str>) -> Result<&str> {
    match tenant {
        Some(t) if !t.trim().is_empty() => Ok(t),
        _ => bail!("no tenant provided; set SITEKV_TENANT or use --tenant"),
    }
}

// ── HTTP client ──────────────────────────────────────────────────────

struct Client {
    http: reqwest::Client,
    addr: String,
}

impl Client {
    fn new(addr: &str) -> Self {
        let http = reqwest::Client::new();
        let addr = addr.trim_end_matches('/').to_owned();
        Self { http, addr }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.addr)
    }

    async fn get(&self, path: &str, query: &[(&str, &str)]) -> Result<Value> {
        let resp = self
            .http
            .get(self.url(path))
            .query(query)
            .send()
            .await
            .context("request failed")?;
        handle_response(resp).await
    }

    async fn post(&self, path: &str, body: &Value) -> Result<Value> {
        let resp = self
            .http
            .post(self.url(path))
            .json(body)
            .send()
            .await
            .context("request failed")?;
        handle_response(resp).await
    }

    async fn delete(&self, path: &str, body: &Value) -> Result<Value> {
        let resp = self
            .http
            .delete(self.url(path))
            .json(body)
            .send()
            .await
            .context("request failed")?;
        handle_response(resp).await
    }
}

async fn handle_response(resp: reqwest::Response) -> Result<Value> {
    let status = resp.status();
    let body = resp.text().await.context("failed to read response body")?;
    if !status.is_success() {
        let message = serde_json::from_str::<Value>(&body)
            .ok()
            .and_then(|v| v.get("error").and_then(Value::as_str).map(str::to_owned))
            .unwrap_or(body);
        bail!("server returned {status}: {message}");
    }
    if body.is_empty() {
        return Ok(Value::Null);
    }
    serde_json::from_str(&body).context("failed to parse response JSON")
}

// ── Command dispatch ─────────────────────────────────────────────────

struct Session<'a> {
    client: Client,
    tenant: Option<&'a str>,
    json: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    let ctx = Session {
        client: Client::new(&cli.addr),
        tenant: cli.tenant.as_deref(),
        json: cli.json,
    };

    match run(&ctx, cli.command).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!();
            eprintln!("  {RED}{BOLD}✗ Error:{RESET} {e:#}");
            eprintln!();
            ExitCode::FAILURE
        }
    }
}

async fn run(ctx: &Session<'_>, cmd: Commands) -> Result<()> {
    match cmd {
        Commands::Status => cmd_status(ctx).await,
        Commands::Page { action } => cmd_record(ctx, Collection::Pages, action).await,
        Commands::Product { action } => cmd_record(ctx, Collection::Products, action).await,
        Commands::Nav { action } => cmd_singleton(ctx, Singleton::Navigation, action).await,
        Commands::Footer { action } => cmd_singleton(ctx, Singleton::Footer, action).await,
        Commands::Bundle {
            page_key,
            nav,
            footer,
        } => cmd_bundle(ctx, &page_key, nav, footer).await,
    }
}

// ── Commands ─────────────────────────────────────────────────────────

async fn cmd_status(ctx: &Session<'_>) -> Result<()> {
    // Any unmatched path answers with the liveness document.
    let resp = ctx.client.get("/", &[]).await?;
    if ctx.json {
        print_json(&resp);
        return Ok(());
    }
    println!();
    println!("  {BANNER_SMALL} {DIM}checking server...{RESET}");
    println!();
    header("🩺", "Server Status");
    let status = resp.get("status").and_then(Value::as_str).unwrap_or("unknown");
    let status = if status == "ok" {
        format!("{GREEN}{status}{RESET}")
    } else {
        format!("{RED}{status}{RESET}")
    };
    kv_line("Status", &status);
    if let Some(service) = resp.get("service").and_then(Value::as_str) {
        kv_line("Service", service);
    }
    kv_line("Address", &ctx.client.addr);
    println!();
    Ok(())
}

async fn cmd_record(ctx: &Session<'_>, collection: Collection, action: RecordCommands) -> Result<()> {
    let base = collection.base();
    let label = collection.label();
    match action {
        RecordCommands::Get { id } => {
            let query: Vec<(&str, &str)> =
                ctx.tenant.map(|t| vec![("tenantId", t)]).unwrap_or_default();
            let path = format!("{base}/{}", record_segment(&id)?);
            let resp = ctx.client.get(&path, &query).await?;
            if ctx.json {
                print_json(&resp);
            } else {
                println!();
                print_document(&format!("{label}: {id}"), &resp);
            }
        }
        RecordCommands::Put { id, document } => {
            let tenant = require_tenant(ctx.tenant)?;
            let document = read_document(&document)?;
            let body = json!({ "tenantId": tenant, "document": document });
            let path = format!("{base}/{}", record_segment(&id)?);
            let resp = ctx.client.post(&path, &body).await?;
            report_written(ctx, &resp, &format!("{label} written"));
        }
        RecordCommands::Delete { id } => {
            let tenant = require_tenant(ctx.tenant)?;
            let body = json!({ "tenantId": tenant });
            let path = format!("{base}/delete/{}", record_segment(&id)?);
            let resp = ctx.client.delete(&path, &body).await?;
            report_written(ctx, &resp, &format!("{label} deleted"));
        }
        RecordCommands::List => {
            let tenant = require_tenant(ctx.tenant)?;
            let body = json!({ "tenantId": tenant });
            let resp = ctx.client.post(&format!("{base}/all"), &body).await?;
            if ctx.json {
                print_json(&resp);
            } else {
                let records: Vec<ListedRecord> =
                    serde_json::from_value(resp).context("unexpected list response")?;
                println!();
                print_listing(&format!("{label}s: {tenant}"), &records);
            }
        }
    }
    Ok(())
}

async fn cmd_singleton(ctx: &Session<'_>, singleton: Singleton, action: SingletonCommands) -> Result<()> {
    let tenant = require_tenant(ctx.tenant)?;
    let base = singleton.base();
    let label = singleton.label();
    match action {
        SingletonCommands::Get => {
            let path = format!("{base}/{}", urlencoding::encode(tenant));
            let resp = ctx.client.get(&path, &[]).await?;
            if ctx.json {
                print_json(&resp);
            } else if resp == json!({ "exists": false }) {
                println!();
                warning(&format!("{label} is not configured for {tenant}."));
                println!();
            } else {
                println!();
                print_document(&format!("{label}: {tenant}"), &resp);
            }
        }
        SingletonCommands::Set { document } => {
            let document = read_document(&document)?;
            let body = json!({ "tenantId": tenant, "document": document });
            let resp = ctx.client.post(base, &body).await?;
            report_written(ctx, &resp, &format!("{label} written"));
        }
    }
    Ok(())
}

async fn cmd_bundle(
    ctx: &Session<'_>,
    page_key: &str,
    nav: Option<String>,
    footer: Option<String>,
) -> Result<()> {
    let body = json!({
        "pageKey": page_key,
        "navigationKey": nav,
        "footerKey": footer,
    });
    let resp = ctx.client.post("/api/getAllData", &body).await?;
    if ctx.json {
        print_json(&resp);
        return Ok(());
    }

    println!();
    for (part, title) in [("page", "Page"), ("navigation", "Navigation"), ("footer", "Footer")] {
        match resp.get(part) {
            Some(Value::Null) | None => {
                warning(&format!("{title}: not found"));
                println!();
            }
            Some(doc) => print_document(title, doc),
        }
    }
    Ok(())
}

fn report_written(ctx: &Session<'_>, resp: &Value, what: &str) {
    if ctx.json {
        print_json(resp);
        return;
    }
    let key = resp.get("key").and_then(Value::as_str).unwrap_or("?");
    println!();
    success(&format!("{what}: {BOLD}{key}{RESET}"));
    println!();
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    #[test]
    fn inline_document() {
        assert_eq!(read_document(r#"{"a":1}"#).unwrap(), json!({"a": 1}));
        assert!(read_document("{nope").is_err());
    }

    #[test]
    fn document_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("doc.json");
        std::fs::write(&path, r#"{"links":[]}"#).unwrap();
        let arg = format!("@{}", path.display());
        assert_eq!(read_document(&arg).unwrap(), json!({"links": []}));
    }

    #[test]
    fn reserved_ids_are_rejected() {
        for id in ["all", "delete", "", "  "] {
            assert!(record_segment(id).is_err(), "{id:?}");
        }
        assert_eq!(record_segment("about").unwrap(), "about");
        assert_eq!(record_segment("all-products").unwrap(), "all-products");
        assert_eq!(record_segment("blog/first").unwrap(), "blog%2Ffirst");
    }

    #[test]
    fn tenant_is_required_for_writes() {
        assert!(require_tenant(None).is_err());
        assert!(require_tenant(Some(" ")).is_err());
        assert_eq!(require_tenant(Some("site1")).unwrap(), "site1");
    }

    #[test]
    fn client_strips_trailing_slash() {
        let client = Client::new("http://localhost:8787/");
        assert_eq!(client.url("/api/pages/all"), "http://localhost:8787/api/pages/all");
    }
}
