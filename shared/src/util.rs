/// Random token used as a client-side order id
///
/// 10 lowercase hex characters taken from a v4 UUID.
pub fn order_token() -> String {
    let mut token = uuid::Uuid::new_v4().simple().to_string();
    token.truncate(10);
    token
}
