use crate::model::Proxy;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ProxyStore {
    proxies: Vec<Proxy>,
    pub loading: bool,
    pub error: Option<String>,
}

impl ProxyStore {
    pub fn proxies(&self) -> &[Proxy] {
        &self.proxies
    }

    /// Most recently used first, never-used last.
    pub fn replace(&mut self, mut proxies: Vec<Proxy>) {
        proxies.sort_by(|a, b| b.last_used.cmp(&a.last_used).then_with(|| a.url.cmp(&b.url)));
        self.proxies = proxies;
        self.loading = false;
        self.error = None;
    }
}
