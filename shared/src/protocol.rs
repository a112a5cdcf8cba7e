use crate::{
    AuthPayload, LoginRequest, ProfileRequest, ProfileResponse, RegisterAck, RegisterRequest,
    VerifyPhoneRequest,
};
use serde::{Deserialize, Serialize, de::DeserializeOwned};

/// HTTP Methods for API Requests
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HttpMethod {
    Get,
    Post,
}

/// A trait that defines the request-response relationship and metadata for an API endpoint.
pub trait ApiRequest: Serialize + DeserializeOwned {
    /// The response type returned by this request.
    type Response: Serialize + DeserializeOwned;
    /// The URL path (or suffix).
    const PATH: &'static str;
    /// The HTTP method.
    const METHOD: HttpMethod;
    /// Whether the endpoint expects an authenticated caller.
    ///
    /// A 401 on such an endpoint means the session has expired; on a
    /// public endpoint it is an ordinary rejection (e.g. a bad password).
    const REQUIRES_AUTH: bool;
}

// =========================================================
// Endpoint Definitions
// =========================================================

impl ApiRequest for LoginRequest {
    type Response = AuthPayload;
    const PATH: &'static str = "/auth/login";
    const METHOD: HttpMethod = HttpMethod::Post;
    const REQUIRES_AUTH: bool = false;
}

impl ApiRequest for RegisterRequest {
    type Response = RegisterAck;
    const PATH: &'static str = "/auth/register";
    const METHOD: HttpMethod = HttpMethod::Post;
    const REQUIRES_AUTH: bool = false;
}

impl ApiRequest for VerifyPhoneRequest {
    type Response = AuthPayload;
    const PATH: &'static str = "/auth/verify-phone";
    const METHOD: HttpMethod = HttpMethod::Post;
    const REQUIRES_AUTH: bool = false;
}

impl ApiRequest for ProfileRequest {
    type Response = ProfileResponse;
    const PATH: &'static str = "/auth/profile";
    const METHOD: HttpMethod = HttpMethod::Get;
    const REQUIRES_AUTH: bool = true;
}
