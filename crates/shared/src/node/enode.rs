use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref ENODE_RE: Regex = Regex::new(r"^enode://\w+@([\d.]+):\d+").unwrap();
}

/// Extracts the IPv4 host of a connection descriptor of the form
/// `enode://<hex-id>@<ipv4>:<port>[?query]`.
pub fn enode_ip(descriptor: &str) -> Option<&str> {
    ENODE_RE
        .captures(descriptor)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extracts_ipv4() {
        assert_eq!(
            enode_ip("enode://19dc6b15744e@43.134.121.187:30311"),
            Some("43.134.121.187")
        );
        assert_eq!(
            enode_ip("enode://19dc6b15744e@10.1.2.3:30311?discport=0"),
            Some("10.1.2.3")
        );
    }

    #[test]
    fn test_rejects_other_descriptors() {
        assert_eq!(
            enode_ip("enr:-IS4QHCYrYZbAKWCBRlAy5zzaDZXJBGkcnh4MHcBFZntXNFrdvJjX04jRzjz"),
            None
        );
        assert_eq!(enode_ip("enode://abcd@[::1]:30311"), None);
        assert_eq!(enode_ip(""), None);
    }
}
