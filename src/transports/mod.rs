mod common;
pub use common::{JsonRpcError, Request, Response};

mod http;
pub use self::http::{ClientError, Http};

mod mock;
pub use mock::{MockError, MockProvider, MockResponse};
