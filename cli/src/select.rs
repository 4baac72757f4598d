use std::fs;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Resolve the PEM file to process.
///
/// An explicit path is validated and returned as-is; otherwise the
/// current directory is scanned and the user picks interactively.
pub(crate) fn select_pem_file(file: Option<&str>) -> Result<PathBuf> {
    if let Some(path) = file {
        if !Path::new(path).exists() {
            return Err(Error::FileNotFound(path.to_string()));
        }
        return Ok(PathBuf::from(path));
    }

    println!("looking for PEM files in current directory...");
    let files = find_pem_files(Path::new("."))?;
    if files.is_empty() {
        println!("usage: decant --file <path-to-pem-file>");
        return Err(Error::NoPemFiles);
    }

    println!();
    println!("available PEM files:");
    for (i, file) in files.iter().enumerate() {
        println!("  {}. {}", i + 1, file.display());
    }

    let stdin = io::stdin();
    prompt_selection(&files, &mut stdin.lock())
}

/// Regular files in `dir` whose name ends with `.pem` (case-sensitive),
/// sorted lexicographically.
pub(crate) fn find_pem_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        let name = entry.file_name();
        if name.to_string_lossy().ends_with(".pem") {
            files.push(PathBuf::from(name));
        }
    }
    files.sort();
    Ok(files)
}

/// Prompt until a selection is accepted: empty input picks the first
/// file, a valid 1-based number picks that file, anything else retries.
fn prompt_selection<R: BufRead>(files: &[PathBuf], input: &mut R) -> Result<PathBuf> {
    loop {
        print!("enter the number of the file to process (or press Enter for file 1): ");
        io::stdout().flush()?;

        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            return Err(Error::InputClosed);
        }

        let choice = line.trim();
        if choice.is_empty() {
            return Ok(files[0].clone());
        }

        match choice.parse::<usize>() {
            Ok(n) if n >= 1 && n <= files.len() => return Ok(files[n - 1].clone()),
            Ok(_) => println!("invalid selection, try again"),
            Err(_) => println!("enter a valid number"),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use rstest::rstest;

    use super::prompt_selection;
    use crate::error::Error;

    fn files() -> Vec<PathBuf> {
        vec![
            PathBuf::from("a.pem"),
            PathBuf::from("b.pem"),
            PathBuf::from("c.pem"),
        ]
    }

    #[rstest(
        input,
        expected,
        case("\n", "a.pem"),
        case("1\n", "a.pem"),
        case("3\n", "c.pem"),
        case("  2  \n", "b.pem"),
        // invalid attempts fall through to the next line
        case("0\n4\nx\n2\n", "b.pem"),
        // missing trailing newline on the last line still selects
        case("3", "c.pem")
    )]
    fn test_prompt_selection(input: &str, expected: &str) {
        let got = prompt_selection(&files(), &mut input.as_bytes()).unwrap();
        assert_eq!(PathBuf::from(expected), got);
    }

    #[rstest(input, case(""), case("0\n"), case("nope\n"))]
    fn test_prompt_selection_input_closed(input: &str) {
        let got = prompt_selection(&files(), &mut input.as_bytes());
        assert!(matches!(got, Err(Error::InputClosed)));
    }
}
