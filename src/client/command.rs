//! RouterOS API command builder.

use std::fmt;

/// Attributes whose values are never written to logs.
const SECRET_ATTRIBUTES: &[&str] = &["password"];

/// One API command: a path word followed by attribute and query words.
///
/// # Example
///
/// ```
/// use mikrotik_exporter::client::Command;
///
/// let cmd = Command::new("/ip/dhcp-server/lease/print")
///     .query("status", "bound")
///     .proplist(&["server", "expires-after"]);
/// assert_eq!(cmd.words()[1], "?status=bound");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    words: Vec<String>,
}

impl Command {
    /// Start a command for the given menu path (e.g. `/interface/print`).
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            words: vec![path.into()],
        }
    }

    /// Add an attribute word `=key=value`.
    pub fn attr(mut self, key: &str, value: impl AsRef<str>) -> Self {
        self.words.push(format!("={}={}", key, value.as_ref()));
        self
    }

    /// Add a query word `?key=value`.
    pub fn query(mut self, key: &str, value: impl AsRef<str>) -> Self {
        self.words.push(format!("?{}={}", key, value.as_ref()));
        self
    }

    /// Restrict the reply to the listed properties.
    pub fn proplist(self, props: &[&str]) -> Self {
        self.attr(".proplist", props.join(","))
    }

    /// Ask only for the number of matching items (reply in `=ret=`).
    pub fn count_only(self) -> Self {
        self.attr("count-only", "")
    }

    /// Run a monitor-style command once instead of streaming.
    pub fn once(self) -> Self {
        self.attr("once", "")
    }

    /// The menu path word.
    pub fn path(&self) -> &str {
        &self.words[0]
    }

    /// All words, path first.
    pub fn words(&self) -> &[String] {
        &self.words
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, word) in self.words.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            let secret = SECRET_ATTRIBUTES
                .iter()
                .find(|attr| word.starts_with(&format!("={attr}=")));
            match secret {
                Some(attr) => write!(f, "={attr}=***")?,
                None => f.write_str(word)?,
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_words() {
        let cmd = Command::new("/interface/ethernet/monitor")
            .attr("numbers", "ether1,ether2")
            .once()
            .proplist(&["name", "status", "rate"]);

        assert_eq!(cmd.path(), "/interface/ethernet/monitor");
        assert_eq!(
            cmd.words(),
            &[
                "/interface/ethernet/monitor",
                "=numbers=ether1,ether2",
                "=once=",
                "=.proplist=name,status,rate",
            ]
        );
    }

    #[test]
    fn test_count_only_and_query() {
        let cmd = Command::new("/ip/pool/used/print")
            .count_only()
            .query("pool", "lan");
        assert_eq!(cmd.words()[1], "=count-only=");
        assert_eq!(cmd.words()[2], "?pool=lan");
    }

    #[test]
    fn test_display_masks_password() {
        let cmd = Command::new("/login")
            .attr("name", "admin")
            .attr("password", "hunter2");
        let shown = cmd.to_string();
        assert_eq!(shown, "/login =name=admin =password=***");
        assert!(!shown.contains("hunter2"));
    }
}
