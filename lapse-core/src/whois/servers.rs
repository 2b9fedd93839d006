use once_cell::sync::Lazy;
use std::collections::HashMap;

/// Root server; answers for any TLD with a `refer:` line naming the registry.
pub const IANA_WHOIS_SERVER: &str = "whois.iana.org";

pub static WHOIS_SERVERS: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    let mut m = HashMap::new();

    // Generic TLDs
    m.insert("com", "whois.verisign-grs.com");
    m.insert("net", "whois.verisign-grs.com");
    m.insert("org", "whois.pir.org");
    m.insert("info", "whois.nic.info");
    m.insert("biz", "whois.nic.biz");
    m.insert("name", "whois.nic.name");
    m.insert("mobi", "whois.nic.mobi");
    m.insert("pro", "whois.nic.pro");
    m.insert("edu", "whois.educause.edu");
    m.insert("gov", "whois.dotgov.gov");
    m.insert("int", "whois.iana.org");

    // Popular new gTLDs
    m.insert("app", "whois.nic.google");
    m.insert("dev", "whois.nic.google");
    m.insert("page", "whois.nic.google");
    m.insert("xyz", "whois.nic.xyz");
    m.insert("online", "whois.nic.online");
    m.insert("site", "whois.nic.site");
    m.insert("tech", "whois.nic.tech");
    m.insert("store", "whois.nic.store");
    m.insert("shop", "whois.nic.shop");
    m.insert("cloud", "whois.nic.cloud");
    m.insert("blog", "whois.nic.blog");

    // Country codes
    m.insert("ai", "whois.nic.ai");
    m.insert("at", "whois.nic.at");
    m.insert("au", "whois.auda.org.au");
    m.insert("be", "whois.dns.be");
    m.insert("br", "whois.registro.br");
    m.insert("ca", "whois.cira.ca");
    m.insert("cc", "ccwhois.verisign-grs.com");
    m.insert("ch", "whois.nic.ch");
    m.insert("cn", "whois.cnnic.cn");
    m.insert("co", "whois.nic.co");
    m.insert("cz", "whois.nic.cz");
    m.insert("de", "whois.denic.de");
    m.insert("dk", "whois.punktum.dk");
    m.insert("es", "whois.nic.es");
    m.insert("eu", "whois.eu");
    m.insert("fi", "whois.fi");
    m.insert("fr", "whois.nic.fr");
    m.insert("io", "whois.nic.io");
    m.insert("it", "whois.nic.it");
    m.insert("jp", "whois.jprs.jp");
    m.insert("kr", "whois.kr");
    m.insert("me", "whois.nic.me");
    m.insert("mx", "whois.mx");
    m.insert("nl", "whois.domain-registry.nl");
    m.insert("no", "whois.norid.no");
    m.insert("nz", "whois.irs.net.nz");
    m.insert("pl", "whois.dns.pl");
    m.insert("ru", "whois.tcinet.ru");
    m.insert("se", "whois.iis.se");
    m.insert("tv", "whois.nic.tv");
    m.insert("uk", "whois.nic.uk");
    m.insert("us", "whois.nic.us");
    m.insert("za", "whois.registry.net.za");

    m
});

pub fn get_whois_server(tld: &str) -> Option<&'static str> {
    WHOIS_SERVERS.get(tld.to_lowercase().as_str()).copied()
}

pub fn get_tld(domain: &str) -> Option<&str> {
    domain.rsplit('.').next().filter(|tld| !tld.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_tld() {
        assert_eq!(get_tld("example.com"), Some("com"));
        assert_eq!(get_tld("example.co.uk"), Some("uk"));
        assert_eq!(get_tld("example."), None);
    }

    #[test]
    fn test_get_whois_server() {
        assert_eq!(get_whois_server("com"), Some("whois.verisign-grs.com"));
        assert_eq!(get_whois_server("UK"), Some("whois.nic.uk"));
        assert_eq!(get_whois_server("zz"), None);
    }
}
