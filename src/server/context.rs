/// Identity facts attached to a request by the authentication gate.
///
/// Lives in the request extensions for the lifetime of a single request.
/// The authorization gate and the handlers read it through
/// `web::ReqData<AuthzContext>`.
#[derive(Debug, Clone, PartialEq)]
pub struct AuthzContext {
    /// Principal identifier, used as the policy subject.
    pub email: String,
    pub subject: String,
    pub name: String,
    pub is_superadmin: bool,
}
