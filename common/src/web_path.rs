/// 固定プレフィックス配下のWebパスを組み立てる
///
/// 出力は常に `/` 区切り。OSのパス区切り文字に依存しない。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WebPathBuilder {
    prefix: String,
}

impl WebPathBuilder {
    pub fn new(prefix: &str) -> Self {
        let prefix = prefix.replace('\\', "/").trim_matches('/').to_string();
        Self { prefix }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// プレフィックスの先頭セグメントに `/` を付けたもの（例: `images/`）
    ///
    /// カタログ内のローカル参照を見分けるのに使う。
    pub fn root_segment(&self) -> String {
        let first = self.prefix.split('/').next().unwrap_or_default();
        format!("{}/", first)
    }

    pub fn to_web_path(&self, file_name: &str) -> String {
        let file_name = file_name.replace('\\', "/");
        if self.prefix.is_empty() {
            return file_name;
        }
        format!("{}/{}", self.prefix, file_name)
    }
}
