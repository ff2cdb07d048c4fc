//! Remote transport
//!
//! Narrow interface over the remote directory so planning and execution
//! stay testable without a network or subprocess. The production
//! implementation shells out to `ssh` and assumes key authentication is
//! already set up for the host.

use std::io::Write;
use std::process::{Command, Stdio};

use crate::config::Profile;
use crate::error::{IglooError, IglooResult};

/// Operations against a single remote directory
pub trait Transport {
    /// Plain files in the remote directory, listing order
    fn list(&self) -> IglooResult<Vec<String>>;

    /// Whether a remote file exists
    fn exists(&self, name: &str) -> bool;

    /// Write bytes to a remote file
    fn push(&self, data: &[u8], name: &str) -> IglooResult<()>;

    /// Read a remote file fully
    fn pull(&self, name: &str) -> IglooResult<Vec<u8>>;

    /// Remove a remote file
    fn delete(&self, name: &str) -> IglooResult<()>;
}

/// Transport over an external `ssh` process
///
/// Every call is one blocking `ssh` invocation against the profile's
/// host, operating inside the profile's remote path.
pub struct SshTransport {
    login: String,
    base: String,
}

impl SshTransport {
    pub fn new(profile: &Profile) -> Self {
        Self {
            login: profile.login(),
            base: profile.path.clone(),
        }
    }

    fn remote_file(&self, name: &str) -> String {
        format!("{}/{}", self.base.trim_end_matches('/'), name)
    }

    fn shell_quote(s: &str) -> String {
        format!("'{}'", s.replace('\'', "'\\''"))
    }

    fn run(&self, remote_cmd: String, context: &str) -> IglooResult<Vec<u8>> {
        let output = Command::new("ssh")
            .arg(&self.login)
            .arg(&remote_cmd)
            .stdin(Stdio::null())
            .output()
            .map_err(|e| IglooError::transport(context, e.to_string()))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(IglooError::transport(context, stderr.trim().to_string()));
        }
        Ok(output.stdout)
    }
}

impl Transport for SshTransport {
    fn list(&self) -> IglooResult<Vec<String>> {
        // -p marks directories with a trailing slash so they can be skipped
        let cmd = format!("ls -1 -p -- {}", Self::shell_quote(&self.base));
        let stdout = self.run(cmd, &self.base)?;
        Ok(String::from_utf8_lossy(&stdout)
            .lines()
            .filter(|line| !line.is_empty() && !line.ends_with('/'))
            .map(|line| line.to_string())
            .collect())
    }

    fn exists(&self, name: &str) -> bool {
        let file = self.remote_file(name);
        Command::new("ssh")
            .arg(&self.login)
            .arg(format!("test -f {}", Self::shell_quote(&file)))
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map(|s| s.success())
            .unwrap_or(false)
    }

    fn push(&self, data: &[u8], name: &str) -> IglooResult<()> {
        let file = self.remote_file(name);
        let mut child = Command::new("ssh")
            .arg(&self.login)
            .arg(format!("cat > {}", Self::shell_quote(&file)))
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| IglooError::transport(name, e.to_string()))?;

        if let Some(stdin) = child.stdin.as_mut() {
            stdin
                .write_all(data)
                .map_err(|e| IglooError::transport(name, e.to_string()))?;
        }
        drop(child.stdin.take());

        let output = child
            .wait_with_output()
            .map_err(|e| IglooError::transport(name, e.to_string()))?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(IglooError::transport(name, stderr.trim().to_string()));
        }
        Ok(())
    }

    fn pull(&self, name: &str) -> IglooResult<Vec<u8>> {
        let file = self.remote_file(name);
        self.run(format!("cat {}", Self::shell_quote(&file)), name)
    }

    fn delete(&self, name: &str) -> IglooResult<()> {
        let file = self.remote_file(name);
        self.run(format!("rm -- {}", Self::shell_quote(&file)), name)?;
        Ok(())
    }
}

/// In-memory transport for tests
///
/// Uses `Arc<Mutex<>>` internally so it can be cloned and inspected after
/// the executor consumed it.
#[cfg(test)]
#[derive(Clone, Default)]
pub struct MockTransport {
    pub files: std::sync::Arc<std::sync::Mutex<Vec<(String, Vec<u8>)>>>,
    pub fail_push: std::sync::Arc<std::sync::Mutex<std::collections::HashSet<String>>>,
    pub fail_pull: std::sync::Arc<std::sync::Mutex<std::collections::HashSet<String>>>,
    pub fail_delete: std::sync::Arc<std::sync::Mutex<std::collections::HashSet<String>>>,
}

#[cfg(test)]
impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_files(names: &[(&str, &[u8])]) -> Self {
        let mock = Self::new();
        {
            let mut files = mock.files.lock().unwrap();
            for (name, data) in names {
                files.push((name.to_string(), data.to_vec()));
            }
        }
        mock
    }

    pub fn fail_pull_on(&self, name: &str) {
        self.fail_pull.lock().unwrap().insert(name.to_string());
    }

    pub fn fail_push_on(&self, name: &str) {
        self.fail_push.lock().unwrap().insert(name.to_string());
    }

    pub fn fail_delete_on(&self, name: &str) {
        self.fail_delete.lock().unwrap().insert(name.to_string());
    }

    pub fn names(&self) -> Vec<String> {
        self.files
            .lock()
            .unwrap()
            .iter()
            .map(|(name, _)| name.clone())
            .collect()
    }
}

#[cfg(test)]
impl Transport for MockTransport {
    fn list(&self) -> IglooResult<Vec<String>> {
        Ok(self.names())
    }

    fn exists(&self, name: &str) -> bool {
        self.files.lock().unwrap().iter().any(|(n, _)| n == name)
    }

    fn push(&self, data: &[u8], name: &str) -> IglooResult<()> {
        if self.fail_push.lock().unwrap().contains(name) {
            return Err(IglooError::transport(name, "push refused"));
        }
        let mut files = self.files.lock().unwrap();
        match files.iter_mut().find(|(n, _)| n == name) {
            Some((_, existing)) => *existing = data.to_vec(),
            None => files.push((name.to_string(), data.to_vec())),
        }
        Ok(())
    }

    fn pull(&self, name: &str) -> IglooResult<Vec<u8>> {
        if self.fail_pull.lock().unwrap().contains(name) {
            return Err(IglooError::transport(name, "pull refused"));
        }
        self.files
            .lock()
            .unwrap()
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, data)| data.clone())
            .ok_or_else(|| IglooError::transport(name, "remote file not found"))
    }

    fn delete(&self, name: &str) -> IglooResult<()> {
        if self.fail_delete.lock().unwrap().contains(name) {
            return Err(IglooError::transport(name, "delete refused"));
        }
        let mut files = self.files.lock().unwrap();
        let before = files.len();
        files.retain(|(n, _)| n != name);
        if files.len() == before {
            return Err(IglooError::transport(name, "remote file not found"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shell_quote_simple() {
        assert_eq!(SshTransport::shell_quote("a b.txt"), "'a b.txt'");
    }

    #[test]
    fn shell_quote_with_quotes() {
        assert_eq!(
            SshTransport::shell_quote("it's.txt"),
            "'it'\\''s.txt'"
        );
    }

    #[test]
    fn remote_file_joins_base_and_name() {
        let profile = Profile {
            name: "default".into(),
            user: "u".into(),
            host: "h".into(),
            path: "/srv/drop/".into(),
            default: true,
        };
        let transport = SshTransport::new(&profile);
        assert_eq!(transport.remote_file("a.txt"), "/srv/drop/a.txt");
    }

    #[test]
    fn mock_round_trip_and_delete() {
        let mock = MockTransport::with_files(&[("a.txt", b"hello")]);
        assert!(mock.exists("a.txt"));
        assert_eq!(mock.pull("a.txt").unwrap(), b"hello");
        mock.delete("a.txt").unwrap();
        assert!(!mock.exists("a.txt"));
        assert!(mock.pull("a.txt").is_err());
    }
}
