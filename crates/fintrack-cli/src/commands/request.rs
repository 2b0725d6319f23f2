//! Request command implementation.

use std::io::{self, Read};

use anyhow::{Context as _, Result, anyhow};
use clap::Args;
use serde_json::Value;

use fintrack::header::{HeaderName, HeaderValue};
use fintrack::{Method, RequestOptions};

use super::print_response;
use crate::session::Context;

#[derive(Args, Debug)]
pub struct RequestArgs {
    /// HTTP method (GET, POST, PUT, PATCH, DELETE)
    pub method: String,

    /// Endpoint path under the API URL (e.g., /wallets)
    pub path: String,

    /// Inline JSON body
    #[arg(long, conflicts_with = "json")]
    pub body: Option<String>,

    /// JSON file with the body (use - for stdin)
    #[arg(long)]
    pub json: Option<String>,

    /// Extra header as "Name: value" (repeatable)
    #[arg(long = "header", short = 'H')]
    pub headers: Vec<String>,

    /// Send without the stored session
    #[arg(long)]
    pub skip_auth: bool,

    /// Print the response on one line
    #[arg(long)]
    pub compact: bool,
}

pub async fn run(args: RequestArgs, ctx: &Context) -> Result<()> {
    let method = Method::from_bytes(args.method.to_ascii_uppercase().as_bytes())
        .with_context(|| format!("Invalid HTTP method '{}'", args.method))?;

    let mut options = RequestOptions::new(method);

    if let Some(body) = read_body(&args)? {
        options = options.with_body(body);
    }

    for raw in &args.headers {
        let (name, value) = parse_header(raw)?;
        options = options.with_header(name, value);
    }

    if args.skip_auth {
        options = options.skip_auth();
    }

    let response = ctx.client.request(&args.path, options).await;
    print_response(&response, args.compact)
}

fn read_body(args: &RequestArgs) -> Result<Option<Value>> {
    if let Some(ref body) = args.body {
        return serde_json::from_str(body)
            .map(Some)
            .context("Invalid JSON in --body");
    }

    let Some(ref path) = args.json else {
        return Ok(None);
    };

    let content = if path == "-" {
        let mut buf = String::new();
        io::stdin()
            .read_to_string(&mut buf)
            .context("Failed to read from stdin")?;
        buf
    } else {
        std::fs::read_to_string(path).context("Failed to read JSON file")?
    };

    serde_json::from_str(&content)
        .map(Some)
        .context("Invalid JSON body")
}

fn parse_header(raw: &str) -> Result<(HeaderName, HeaderValue)> {
    let (name, value) = raw
        .split_once(':')
        .ok_or_else(|| anyhow!("Header '{}' must look like 'Name: value'", raw))?;

    let name = HeaderName::from_bytes(name.trim().as_bytes())
        .with_context(|| format!("Invalid header name in '{}'", raw))?;
    let value = HeaderValue::from_str(value.trim())
        .with_context(|| format!("Invalid header value in '{}'", raw))?;

    Ok((name, value))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_name_value_header() {
        let (name, value) = parse_header("X-Client-Platform: ios").unwrap();
        assert_eq!(name.as_str(), "x-client-platform");
        assert_eq!(value, "ios");
    }

    #[test]
    fn rejects_header_without_colon() {
        assert!(parse_header("X-Broken").is_err());
    }

    #[test]
    fn header_value_may_contain_colons() {
        let (_, value) = parse_header("X-Callback: https://example.com:8443/hook").unwrap();
        assert_eq!(value, "https://example.com:8443/hook");
    }
}
