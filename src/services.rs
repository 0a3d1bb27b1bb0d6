//! Service labels for well-known port numbers.
//!
//! A fixed lookup table; ports that are not listed map to [`UNKNOWN_SERVICE`].

use std::collections::HashMap;
use std::sync::LazyLock;

/// Label returned for ports missing from the table.
pub const UNKNOWN_SERVICE: &str = "Unknown";

/// Static map of well-known ports to service labels.
static PORT_SERVICES: LazyLock<HashMap<u16, &'static str>> = LazyLock::new(|| {
    let mut m = HashMap::new();

    // File transfer and remote shells
    m.insert(20, "FTP-Data");
    m.insert(21, "FTP");
    m.insert(22, "SSH");
    m.insert(23, "Telnet");
    m.insert(69, "TFTP");
    m.insert(2049, "NFS");
    m.insert(3690, "SVN");

    // Mail and news
    m.insert(25, "SMTP");
    m.insert(110, "POP3");
    m.insert(119, "NNTP");
    m.insert(143, "IMAP");
    m.insert(465, "SMTPS");
    m.insert(587, "SMTP-Submission");
    m.insert(993, "IMAPS");
    m.insert(995, "POP3S");

    // Network infrastructure
    m.insert(53, "DNS");
    m.insert(67, "DHCP-Server");
    m.insert(68, "DHCP-Client");
    m.insert(123, "NTP");
    m.insert(161, "SNMP");
    m.insert(162, "SNMP-Trap");
    m.insert(500, "IKE");
    m.insert(514, "Syslog");
    m.insert(515, "LPD");
    m.insert(520, "RIP");
    m.insert(1080, "SOCKS");
    m.insert(1723, "PPTP");
    m.insert(5060, "SIP");
    m.insert(5061, "SIPS");

    // Windows and directory services
    m.insert(111, "RPC");
    m.insert(135, "MS-RPC");
    m.insert(137, "NetBIOS-NS");
    m.insert(138, "NetBIOS-DGM");
    m.insert(139, "NetBIOS-SSN");
    m.insert(389, "LDAP");
    m.insert(445, "SMB");
    m.insert(636, "LDAPS");

    // Remote administration
    m.insert(3389, "RDP");
    m.insert(5900, "VNC");
    m.insert(5985, "WinRM-HTTP");
    m.insert(5986, "WinRM-HTTPS");

    // Web
    m.insert(80, "HTTP");
    m.insert(443, "HTTPS");
    m.insert(4443, "HTTPS-Alt");
    m.insert(8000, "HTTP-Alt");
    m.insert(8080, "HTTP-Proxy");
    m.insert(8443, "HTTPS-Alt");
    m.insert(8888, "HTTP-Alt");
    m.insert(9000, "HTTP-Alt");
    m.insert(9090, "Web-Console");

    // Databases and caches
    m.insert(1433, "MSSQL");
    m.insert(1434, "MSSQL-UDP");
    m.insert(1521, "Oracle");
    m.insert(3306, "MySQL");
    m.insert(5432, "PostgreSQL");
    m.insert(5433, "PostgreSQL-Alt");
    m.insert(6379, "Redis");
    m.insert(9200, "Elasticsearch");
    m.insert(11211, "Memcached");
    m.insert(27017, "MongoDB");

    m
});

/// Look up the service label for a port, if it is well known.
pub fn get_service_name(port: u16) -> Option<&'static str> {
    PORT_SERVICES.get(&port).copied()
}

/// Get the service label for a port, falling back to [`UNKNOWN_SERVICE`].
pub fn get_service_description(port: u16) -> &'static str {
    get_service_name(port).unwrap_or(UNKNOWN_SERVICE)
}
