use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::QwenError;

const PREVIEW_CHARS: usize = 100;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptSource {
    File(PathBuf),
    Arguments,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    pub text: String,
    pub source: PromptSource,
}

// A literal prompt that happens to name an existing file is read as that file.
pub fn resolve_prompt(args: &[OsString]) -> Result<Option<Prompt>, QwenError> {
    let Some(first) = args.first() else {
        return Ok(None);
    };

    let candidate = Path::new(first);
    if candidate.is_file() {
        let text = fs::read_to_string(candidate).map_err(|source| QwenError::PromptUnreadable {
            path: candidate.to_path_buf(),
            source,
        })?;
        return Ok(Some(Prompt {
            text,
            source: PromptSource::File(candidate.to_path_buf()),
        }));
    }

    let words: Vec<_> = args.iter().map(|arg| arg.to_string_lossy()).collect();
    Ok(Some(Prompt {
        text: words.join(" "),
        source: PromptSource::Arguments,
    }))
}

pub fn preview(text: &str) -> String {
    let mut chars = text.chars();
    let head: String = chars.by_ref().take(PREVIEW_CHARS).collect();
    if chars.next().is_some() {
        format!("{head}...")
    } else {
        head
    }
}
