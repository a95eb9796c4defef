use amsdb::core::extract::space_group::SpaceGroupParser;
use amsdb::engine::config::StoreRequest;

pub struct StoreAppConfig {
    pub request: StoreRequest,
    pub parser: SpaceGroupParser,
    /// Print the row table after each write.
    pub report: bool,
}
