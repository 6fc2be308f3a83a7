//! Registrable-domain lookups against the bundled public suffix list,
//! using test vectors from publicsuffix.org (checkPublicSuffix).

use std::path::PathBuf;

use redirect_guard::suffix::{self, SuffixList};
use redirect_guard::GuardError;

fn dataset_path() -> PathBuf {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("data");
    path.push("effective_tld_names.dat");
    path
}

fn assert_domain(list: &SuffixList, host: &str, expected: &str) {
    match list.registrable_domain(host) {
        Ok(domain) => assert_eq!(domain, expected, "registrable domain of {}", host),
        Err(e) => panic!("registrable domain of {} failed: {}", host, e),
    }
}

#[test]
fn test_bundled_list_statistics() {
    let list = SuffixList::bundled();
    let stats = list.stats();
    assert!(stats.plain > 5000, "plain rules: {}", stats.plain);
    assert!(stats.wildcard > 0, "wildcard rules: {}", stats.wildcard);
    assert!(stats.exception > 0, "exception rules: {}", stats.exception);
    assert!(list.len() >= stats.total());
}

#[test]
fn test_file_load_matches_bundled() {
    let from_file = SuffixList::from_file(dataset_path()).unwrap();
    let bundled = SuffixList::bundled();
    assert_eq!(from_file.stats(), bundled.stats());
    assert_eq!(from_file.len(), bundled.len());
}

#[test]
fn test_listed_domains() {
    let list = SuffixList::bundled();
    assert_domain(&list, "example.com", "example.com");
    assert_domain(&list, "b.example.com", "example.com");
    assert_domain(&list, "a.b.example.com", "example.com");
    assert_domain(&list, "test.ac", "test.ac");
}

#[test]
fn test_two_level_rules() {
    let list = SuffixList::bundled();
    assert_domain(&list, "abcde.co.uk", "abcde.co.uk");
    assert_domain(&list, "www.abcde.co.uk", "abcde.co.uk");
    assert_domain(&list, "example.uk.com", "example.uk.com");
    assert_domain(&list, "b.example.uk.com", "example.uk.com");
    assert_domain(&list, "test.ac.jp", "test.ac.jp");
    assert_domain(&list, "www.test.ac.jp", "test.ac.jp");
}

#[test]
fn test_deeper_rules() {
    let list = SuffixList::bundled();
    assert_domain(&list, "test.kyoto.jp", "test.kyoto.jp");
    assert_domain(&list, "b.ide.kyoto.jp", "b.ide.kyoto.jp");
    assert_domain(&list, "a.b.ide.kyoto.jp", "b.ide.kyoto.jp");
    assert_domain(&list, "test.us", "test.us");
    assert_domain(&list, "www.test.us", "test.us");
    assert_domain(&list, "test.ak.us", "test.ak.us");
    assert_domain(&list, "www.test.ak.us", "test.ak.us");
    assert_domain(&list, "test.k12.ak.us", "test.k12.ak.us");
    assert_domain(&list, "www.test.k12.ak.us", "test.k12.ak.us");
}

#[test]
fn test_wildcard_rules() {
    let list = SuffixList::bundled();
    assert_domain(&list, "b.c.kobe.jp", "b.c.kobe.jp");
    assert_domain(&list, "a.b.c.kobe.jp", "b.c.kobe.jp");
    assert_domain(&list, "b.test.ck", "b.test.ck");
    assert_domain(&list, "a.b.test.ck", "b.test.ck");
}

#[test]
fn test_exception_rules_override_wildcards() {
    let list = SuffixList::bundled();
    assert_domain(&list, "city.kobe.jp", "city.kobe.jp");
    assert_domain(&list, "www.city.kobe.jp", "city.kobe.jp");
    assert_domain(&list, "www.ck", "www.ck");
    assert_domain(&list, "www.www.ck", "www.ck");
}

#[test]
fn test_idn_rules() {
    let list = SuffixList::bundled();
    assert_domain(&list, "食狮.com.cn", "食狮.com.cn");
    assert_domain(&list, "www.食狮.公司.cn", "食狮.公司.cn");
    assert_domain(&list, "shishi.中国", "shishi.中国");
    // Punycode hosts, as produced by URL parsing
    assert_domain(&list, "www.xn--85x722f.xn--55qx5d.cn", "xn--85x722f.xn--55qx5d.cn");
    assert_domain(&list, "shishi.xn--fiqs8s", "shishi.xn--fiqs8s");
}

#[test]
fn test_private_section_rules() {
    let list = SuffixList::bundled();
    assert_domain(&list, "alice.github.io", "alice.github.io");
    assert_domain(&list, "www.alice.github.io", "alice.github.io");
}

#[test]
fn test_mixed_case_and_port() {
    let list = SuffixList::bundled();
    assert_domain(&list, "COM", "com");
    assert_domain(&list, "WwW.Example.COM:8443", "example.com");
}

#[test]
fn test_unlisted_tld_is_unknown() {
    let list = SuffixList::bundled();
    for host in ["example", "example.example", "b.example.notatld", "localhost", "127.0.0.1", ""] {
        assert!(
            matches!(list.registrable_domain(host), Err(GuardError::UnknownSuffix(_))),
            "expected UnknownSuffix for {:?}",
            host
        );
    }
}

#[test]
fn test_global_list_matches_bundled() {
    let bundled = SuffixList::bundled();
    for host in ["a.b.example.com", "www.abcde.co.uk", "a.b.test.ck", "www.city.kobe.jp"] {
        assert_eq!(
            suffix::registrable_domain(host).unwrap(),
            bundled.registrable_domain(host).unwrap(),
            "{}",
            host
        );
    }
}

#[test]
fn test_concurrent_lookups_agree() {
    let hosts = ["a.b.example.com", "www.abcde.co.uk", "www.www.ck", "shop.alice.github.io"];
    let expected: Vec<String> = hosts
        .iter()
        .map(|h| suffix::registrable_domain(h).unwrap())
        .collect();

    let handles: Vec<_> = (0..8)
        .map(|_| {
            std::thread::spawn(move || {
                hosts
                    .iter()
                    .map(|h| suffix::registrable_domain(h).unwrap())
                    .collect::<Vec<_>>()
            })
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.join().unwrap(), expected);
    }
}
