use std::collections::HashMap;

use once_cell::sync::Lazy;

/// Built-in TLD -> authoritative WHOIS host table.
static WHOIS_SERVERS: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    let mut m = HashMap::new();

    // Generic TLDs
    m.insert("com", "whois.verisign-grs.com");
    m.insert("net", "whois.verisign-grs.com");
    m.insert("org", "whois.pir.org");
    m.insert("info", "whois.afilias.net");
    m.insert("biz", "whois.neulevel.biz");
    m.insert("edu", "whois.educause.edu");

    // New gTLDs
    m.insert("app", "whois.nic.google");
    m.insert("dev", "whois.nic.google");
    m.insert("io", "whois.nic.io");
    m.insert("co", "whois.nic.co");
    m.insert("me", "whois.nic.me");
    m.insert("tv", "tvwhois.verisign-grs.com");
    m.insert("cc", "ccwhois.verisign-grs.com");
    m.insert("xyz", "whois.nic.xyz");
    m.insert("online", "whois.nic.online");
    m.insert("site", "whois.nic.site");
    m.insert("tech", "whois.nic.tech");
    m.insert("shop", "whois.nic.shop");
    m.insert("cloud", "whois.nic.cloud");

    // Country code TLDs
    m.insert("it", "whois.nic.it");
    m.insert("de", "whois.denic.de");
    m.insert("fr", "whois.nic.fr");
    m.insert("uk", "whois.nic.uk");
    m.insert("nl", "whois.domain-registry.nl");
    m.insert("eu", "whois.eu");
    m.insert("ch", "whois.nic.ch");
    m.insert("at", "whois.nic.at");
    m.insert("be", "whois.dns.be");
    m.insert("es", "whois.nic.es");
    m.insert("pl", "whois.dns.pl");
    m.insert("cz", "whois.nic.cz");
    m.insert("us", "whois.nic.us");
    m.insert("ca", "whois.cira.ca");
    m.insert("au", "whois.auda.org.au");
    m.insert("jp", "whois.jprs.jp");
    m.insert("br", "whois.registro.br");
    m.insert("se", "whois.iis.se");
    m.insert("dk", "whois.dk-hostmaster.dk");
    m.insert("fi", "whois.fi");

    m
});

/// Registries with a secondary WHOIS host worth trying when the primary
/// probe fails.
static FALLBACK_SERVERS: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    let mut m = HashMap::new();
    m.insert("it", "whois.registro.it");
    m
});

/// Maps a TLD to the WHOIS host that answers for it, plus an optional
/// per-TLD fallback host.
///
/// The built-in tables cover the common registries; per-instance overrides
/// let configuration extend or replace entries. The directory is immutable
/// once built, so lookups never race. Hosts may carry an explicit `:port`;
/// bare hosts imply the WHOIS port.
#[derive(Debug, Clone, Default)]
pub struct RegistryDirectory {
    server_overrides: HashMap<String, String>,
    fallback_overrides: HashMap<String, String>,
}

impl RegistryDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Map a TLD to a WHOIS host, shadowing any built-in entry.
    pub fn with_server(mut self, tld: &str, server: &str) -> Self {
        self.server_overrides
            .insert(tld.to_lowercase(), server.to_string());
        self
    }

    /// Give a TLD a fallback host, shadowing any built-in entry.
    pub fn with_fallback(mut self, tld: &str, server: &str) -> Self {
        self.fallback_overrides
            .insert(tld.to_lowercase(), server.to_string());
        self
    }

    /// The authoritative WHOIS host for a TLD, if one is known.
    pub fn server_for(&self, tld: &str) -> Option<&str> {
        let key = tld.to_lowercase();
        if let Some(server) = self.server_overrides.get(&key) {
            return Some(server.as_str());
        }
        WHOIS_SERVERS.get(key.as_str()).copied()
    }

    /// The fallback host for a TLD. Most registries have none.
    pub fn fallback_for(&self, tld: &str) -> Option<&str> {
        let key = tld.to_lowercase();
        if let Some(server) = self.fallback_overrides.get(&key) {
            return Some(server.as_str());
        }
        FALLBACK_SERVERS.get(key.as_str()).copied()
    }

    /// All TLDs with a mapping, overrides included, sorted.
    pub fn known_tlds(&self) -> Vec<String> {
        let mut tlds: Vec<String> = WHOIS_SERVERS.keys().map(|tld| tld.to_string()).collect();
        tlds.extend(self.server_overrides.keys().cloned());
        tlds.sort();
        tlds.dedup();
        tlds
    }
}
