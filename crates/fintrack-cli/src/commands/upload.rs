//! Upload command implementation.

use std::path::Path;

use anyhow::{Context as _, Result, anyhow};
use clap::Args;

use fintrack::UploadForm;

use super::print_response;
use crate::session::Context;

#[derive(Args, Debug)]
pub struct UploadArgs {
    /// Endpoint path under the API URL (e.g., /ocr/receipts)
    pub path: String,

    /// Text field as name=value (repeatable)
    #[arg(long = "field", short = 'F')]
    pub fields: Vec<String>,

    /// File field as name=path (repeatable)
    #[arg(long = "file", short = 'f')]
    pub files: Vec<String>,

    /// Print the response on one line
    #[arg(long)]
    pub compact: bool,
}

pub async fn run(args: UploadArgs, ctx: &Context) -> Result<()> {
    let mut form = UploadForm::new();

    for raw in &args.fields {
        let (name, value) = split_pair(raw)?;
        form = form.text(name, value);
    }

    for raw in &args.files {
        let (name, path) = split_pair(raw)?;
        let path = Path::new(path);
        let bytes = tokio::fs::read(path)
            .await
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload".to_string());

        form = match guess_mime(path) {
            Some(mime) => form.file_with_mime(name, file_name, bytes, mime),
            None => form.file(name, file_name, bytes),
        };
    }

    if form.is_empty() {
        return Err(anyhow!("Nothing to upload; pass --field or --file"));
    }

    let response = ctx.client.upload_form_data(&args.path, form).await;
    print_response(&response, args.compact)
}

fn split_pair(raw: &str) -> Result<(&str, &str)> {
    raw.split_once('=')
        .filter(|(name, _)| !name.is_empty())
        .ok_or_else(|| anyhow!("'{}' must look like name=value", raw))
}

fn guess_mime(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    match ext.as_str() {
        "jpg" | "jpeg" => Some("image/jpeg"),
        "png" => Some("image/png"),
        "heic" => Some("image/heic"),
        "webp" => Some("image/webp"),
        "pdf" => Some("application/pdf"),
        "csv" => Some("text/csv"),
        _ => None,
    }
}
