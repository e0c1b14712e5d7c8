//! Static tool catalog: reconnaissance tool names mapped to Metasploit
//! auxiliary modules, with the metadata surfaced by the tool listing.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToolEntry {
    pub name: &'static str,
    pub module: &'static str,
    pub description: &'static str,
    pub category: &'static str,
    pub config_options: &'static [&'static str],
}

pub const CATALOG: &[ToolEntry] = &[
    ToolEntry {
        name: "ping-sweep",
        module: "auxiliary/scanner/discovery/udp_sweep",
        description: "Ping sweep to discover live hosts",
        category: "discovery",
        config_options: &["timeout", "threads"],
    },
    ToolEntry {
        name: "tcp-syn-scan",
        module: "auxiliary/scanner/portscan/syn",
        description: "TCP SYN port scan",
        category: "port_scan",
        config_options: &["port_range", "threads", "timeout"],
    },
    ToolEntry {
        name: "udp-scan",
        module: "auxiliary/scanner/discovery/udp_sweep",
        description: "UDP port scan",
        category: "port_scan",
        config_options: &["port_range", "timeout"],
    },
    ToolEntry {
        name: "service-version-scan",
        module: "auxiliary/scanner/portscan/tcp",
        description: "Service and version detection",
        category: "service_scan",
        config_options: &["intensity", "timeout"],
    },
    ToolEntry {
        name: "os-fingerprint",
        module: "auxiliary/scanner/portscan/tcp",
        description: "Operating system fingerprinting",
        category: "fingerprint",
        config_options: &["timeout"],
    },
    ToolEntry {
        name: "smb-enum",
        module: "auxiliary/scanner/smb/smb_enumshares",
        description: "SMB enumeration",
        category: "network_service",
        config_options: &["timeout", "username", "password"],
    },
    ToolEntry {
        name: "snmp-enum",
        module: "auxiliary/scanner/snmp/snmp_enum",
        description: "SNMP enumeration",
        category: "network_service",
        config_options: &["community_strings", "timeout"],
    },
    ToolEntry {
        name: "dns-enum",
        module: "auxiliary/gather/dns_enum",
        description: "DNS enumeration",
        category: "network_service",
        config_options: &["timeout", "threads"],
    },
    ToolEntry {
        name: "web-crawl",
        module: "auxiliary/scanner/http/crawl",
        description: "Web crawling and spidering",
        category: "web",
        config_options: &["user_agent", "max_depth", "timeout"],
    },
    ToolEntry {
        name: "web-app-scan",
        module: "auxiliary/scanner/http/http_version",
        description: "Web application vulnerability scanning",
        category: "web",
        config_options: &["timeout", "threads"],
    },
    ToolEntry {
        name: "cve-lookup",
        module: "auxiliary/scanner/portscan/tcp",
        description: "CVE vulnerability lookup",
        category: "vulnerability",
        config_options: &["timeout"],
    },
];

pub fn lookup(name: &str) -> Option<&'static ToolEntry> {
    CATALOG.iter().find(|t| t.name == name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_tools_resolve() {
        let entry = lookup("tcp-syn-scan").unwrap();
        assert_eq!(entry.module, "auxiliary/scanner/portscan/syn");
        assert_eq!(entry.category, "port_scan");
    }

    #[test]
    fn unknown_tools_do_not() {
        assert!(lookup("frobnicate").is_none());
        assert!(lookup("").is_none());
    }

    #[test]
    fn names_are_unique() {
        for (i, a) in CATALOG.iter().enumerate() {
            for b in &CATALOG[i + 1..] {
                assert_ne!(a.name, b.name);
            }
        }
    }
}
