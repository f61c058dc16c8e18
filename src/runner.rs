use chrono::Local;
use colored::Colorize;
use std::io::Write;

use crate::client::{extract_answer, Transport};
use crate::config::Config;
use crate::credential::{parse_token, resolve_credential_path, Filesystem};
use crate::error::AppError;
use crate::storage;

pub const SHORT_INSTRUCTION: &str = "Keep your answer short. ";

/// Flags for one invocation. Build with [`Options::new`] so debug always clears quiet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Options {
    pub prompt: String,
    pub short: bool,
    pub keep: bool,
    pub debug: bool,
    pub quiet: bool,
}

impl Options {
    pub fn new(prompt: String, short: bool, keep: bool, debug: bool, quiet: bool) -> Self {
        Self {
            prompt,
            short,
            keep,
            debug,
            quiet: quiet && !debug,
        }
    }

    pub fn effective_prompt(&self) -> String {
        if self.short {
            format!("{}{}", SHORT_INSTRUCTION, self.prompt)
        } else {
            self.prompt.clone()
        }
    }
}

/// Runs one prompt/answer exchange, writing user-facing output to `out`.
pub async fn run<T, F, W>(
    options: &Options,
    config: &Config,
    transport: &T,
    fs: &F,
    out: &mut W,
) -> Result<(), AppError>
where
    T: Transport,
    F: Filesystem,
    W: Write,
{
    let prompt = options.effective_prompt();
    if options.debug {
        writeln!(out, "DEBUG: prompt: {}", prompt)?;
    }

    let location = resolve_credential_path(&config.token_candidates(), fs).ok_or_else(|| {
        AppError::CredentialNotFound {
            candidates: config.token_paths.clone(),
        }
    })?;

    let content = fs.read_to_string(&location).map_err(|e| {
        tracing::warn!(path = %location.display(), error = %e, "token file unreadable");
        AppError::CredentialInvalid {
            location: location.clone(),
            multiline: false,
        }
    })?;

    let credential = match parse_token(&content, &config.token_rule) {
        Ok(credential) => credential,
        Err(invalid) => {
            if options.debug {
                writeln!(out, "DEBUG: gemini_token: {}", invalid.token)?;
                writeln!(out, "DEBUG: token length: {}", invalid.len)?;
                writeln!(
                    out,
                    "DEBUG: length >= {}: {}",
                    config.token_rule.min_len, invalid.long_enough
                )?;
                writeln!(
                    out,
                    "DEBUG: length <= {}: {}",
                    config.token_rule.max_len, invalid.short_enough
                )?;
                writeln!(out, "DEBUG: single line: {}", invalid.single_line)?;
            }
            return Err(AppError::CredentialInvalid {
                location,
                multiline: !invalid.single_line,
            });
        }
    };

    if options.debug {
        writeln!(out, "DEBUG: gemini_token: {}", credential.as_str())?;
    }
    if !options.quiet {
        writeln!(out, "Sending request...")?;
    }

    let reply = transport.send_prompt(&prompt, &credential).await?;

    if !reply.status.is_success() {
        let dump = storage::error_dump_path(&config.log_dir);
        writeln!(
            out,
            "Something went wrong... Dumping output to {}",
            dump.display()
        )?;
        storage::write_log_file(&dump, &reply.body)?;
        return Err(AppError::HttpRequestFailed(format!(
            "API returned {}",
            reply.status
        )));
    }

    let answer = extract_answer(&reply.body)?;
    writeln!(out, "{}", answer)?;

    let exchange = storage::exchange_text(&prompt, &answer);

    if let Err(e) = storage::write_scratch(&config.scratch_dir, &exchange) {
        tracing::debug!(error = %e, "scratch file not written");
        if !options.quiet {
            let message = format!(
                "Warning: could not write {}: {}",
                storage::scratch_path(&config.scratch_dir).display(),
                e
            );
            writeln!(out, "{}", message.yellow())?;
        }
    }

    if options.keep {
        let path = storage::keep_log_path(&config.log_dir, Local::now());
        if options.debug {
            writeln!(out, "DEBUG: content_location: {}", path.display())?;
        }
        storage::write_log_file(&path, &exchange)?;
        writeln!(out, "{}", format!("✓ Exchange saved to {}", path.display()).green())?;
    }

    Ok(())
}
