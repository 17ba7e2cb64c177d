use rand::distributions::Alphanumeric;
use rand::Rng;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

#[cfg(unix)]
use std::os::unix::fs::PermissionsExt;

/// Ensure directory exists.
pub fn ensure_dir(path: &Path) -> Result<(), String> {
    if !path.exists() {
        fs::create_dir_all(path)
            .map_err(|e| format!("Unable to create directory {}: {}", path.display(), e))?;
    }
    #[cfg(unix)]
    {
        fs::set_permissions(path, fs::Permissions::from_mode(0o700)).ok();
    }
    Ok(())
}

/// Generates a short lowercase id not yet used by a chain file in `dir`.
pub fn new_id(dir: &Path) -> String {
    loop {
        let id: String = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(8)
            .map(|c| char::from(c).to_ascii_lowercase())
            .collect();
        if !dir.join(format!("{}.yaml", id)).exists() {
            return id;
        }
    }
}

/// Parses `key=value` assignments. Later assignments win.
pub fn parse_vars(assignments: &[String]) -> Result<HashMap<String, String>, String> {
    let mut map = HashMap::new();
    for assignment in assignments {
        let (key, value) = assignment
            .split_once('=')
            .ok_or_else(|| format!("Invalid variable '{}'. Use key=value", assignment))?;
        let key = key.trim();
        if key.is_empty() {
            return Err(format!("Invalid variable '{}'. Key is empty", assignment));
        }
        map.insert(key.to_string(), value.trim().to_string());
    }
    Ok(map)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_assignments() {
        let vars = parse_vars(&["topic = entropy".into(), "lang=fr=ca".into(), "topic=heat".into()]).unwrap();
        assert_eq!(vars["topic"], "heat");
        assert_eq!(vars["lang"], "fr=ca");
    }

    #[test]
    fn rejects_malformed_assignments() {
        assert!(parse_vars(&["novalue".into()]).is_err());
        assert!(parse_vars(&["=x".into()]).is_err());
    }

    #[test]
    fn new_ids_are_short_and_unused() {
        let tmp = tempfile::TempDir::new().unwrap();
        let id = new_id(tmp.path());
        assert_eq!(id.len(), 8);
        assert!(id.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit()));
    }
}
