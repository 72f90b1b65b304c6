use std::path::{Path, PathBuf};

use gpgcfg_core::config;

pub(crate) fn run_config_generate(dest: Option<&str>) -> Result<(), Box<dyn std::error::Error>> {
    let path = match dest {
        Some(d) => config::expand_tilde(d),
        None => pick_config_location()?,
    };
    write_template(&path)?;
    println!("Settings written to: {}", path.display());
    Ok(())
}

fn write_template(path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    if path.exists() {
        return Err(format!("file already exists: {}", path.display()).into());
    }
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent)?;
        }
    }
    std::fs::write(path, config::minimal_config_template())?;
    Ok(())
}

fn pick_config_location() -> Result<PathBuf, Box<dyn std::error::Error>> {
    let search_paths = config::default_config_search_paths();

    eprintln!("Where should the settings file live?");
    for (i, (path, level)) in search_paths.iter().enumerate() {
        eprintln!("  [{}] {:8} {}", i + 1, level, path.display());
    }
    eprint!("Choice [1]: ");
    std::io::Write::flush(&mut std::io::stderr())?;

    let mut input = String::new();
    std::io::stdin().read_line(&mut input)?;
    let choice = parse_choice(input.trim(), search_paths.len())?;
    Ok(search_paths[choice].0.clone())
}

fn parse_choice(input: &str, count: usize) -> Result<usize, String> {
    if input.is_empty() {
        return Ok(0);
    }
    let n: usize = input
        .parse()
        .map_err(|_| format!("invalid choice: '{input}'"))?;
    if n == 0 || n > count {
        return Err(format!("choice out of range: {n}"));
    }
    Ok(n - 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_choice_is_the_first_path() {
        assert_eq!(parse_choice("", 3), Ok(0));
        assert_eq!(parse_choice("3", 3), Ok(2));
    }

    #[test]
    fn bad_choices_are_rejected() {
        assert!(parse_choice("0", 3).is_err());
        assert!(parse_choice("4", 3).is_err());
        assert!(parse_choice("two", 3).is_err());
    }

    #[test]
    fn template_is_written_once() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("nested").join("config.yaml");
        write_template(&path).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text, config::minimal_config_template());
        assert!(config::parse_settings(&text, &path).is_ok());

        let err = write_template(&path).unwrap_err();
        assert!(err.to_string().contains("already exists"));
    }
}
