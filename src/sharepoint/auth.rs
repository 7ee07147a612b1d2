//! SharePoint user-credential authentication.
//!
//! Legacy STS flow: post a SAML request-security-token envelope with the user
//! credentials, receive a binary security token, then redeem the token at the
//! tenant's sign-in endpoint, which answers with the FedAuth/rtFa session
//! cookies.

use regex::Regex;

use crate::error::{EtlError, Result};

/// Microsoft online security token service endpoint.
pub const STS_URL: &str = "https://login.microsoftonline.com/extSTS.srf";

/// Builds the SAML RST envelope for a username/password token request.
pub fn security_token_request(username: &str, password: &str, site_url: &str) -> String {
    format!(
        r#"<s:Envelope xmlns:s="http://www.w3.org/2003/05/soap-envelope"
  xmlns:a="http://www.w3.org/2005/08/addressing"
  xmlns:u="http://docs.oasis-open.org/wss/2004/01/oasis-200401-wss-wssecurity-utility-1.0.xsd">
  <s:Header>
    <a:Action s:mustUnderstand="1">http://schemas.xmlsoap.org/ws/2005/02/trust/RST/Issue</a:Action>
    <a:ReplyTo>
      <a:Address>http://www.w3.org/2005/08/addressing/anonymous</a:Address>
    </a:ReplyTo>
    <a:To s:mustUnderstand="1">{sts}</a:To>
    <o:Security s:mustUnderstand="1"
      xmlns:o="http://docs.oasis-open.org/wss/2004/01/oasis-200401-wss-wssecurity-secext-1.0.xsd">
      <o:UsernameToken>
        <o:Username>{username}</o:Username>
        <o:Password>{password}</o:Password>
      </o:UsernameToken>
    </o:Security>
  </s:Header>
  <s:Body>
    <t:RequestSecurityToken xmlns:t="http://schemas.xmlsoap.org/ws/2005/02/trust">
      <wsp:AppliesTo xmlns:wsp="http://schemas.xmlsoap.org/ws/2004/09/policy">
        <a:EndpointReference>
          <a:Address>{site}</a:Address>
        </a:EndpointReference>
      </wsp:AppliesTo>
      <t:KeyType>http://schemas.xmlsoap.org/ws/2005/05/identity/NoProofKey</t:KeyType>
      <t:RequestType>http://schemas.xmlsoap.org/ws/2005/02/trust/Issue</t:RequestType>
      <t:TokenType>urn:oasis:names:tc:SAML:1.0:assertion</t:TokenType>
    </t:RequestSecurityToken>
  </s:Body>
</s:Envelope>"#,
        sts = STS_URL,
        username = xml_escape(username),
        password = xml_escape(password),
        site = xml_escape(site_url),
    )
}

/// Pulls the binary security token out of the STS response, surfacing the
/// service's fault text when authentication was rejected.
pub fn extract_security_token(body: &str) -> Result<String> {
    let token_re = Regex::new(r"<wsse:BinarySecurityToken[^>]*>([^<]+)</wsse:BinarySecurityToken>")
        .expect("static regex");
    if let Some(captures) = token_re.captures(body) {
        return Ok(captures[1].to_string());
    }

    let fault_re = Regex::new(r"<psf:text>([^<]+)</psf:text>").expect("static regex");
    let reason = fault_re
        .captures(body)
        .map(|captures| captures[1].trim().to_string())
        .unwrap_or_else(|| "no security token in STS response".to_string());
    Err(EtlError::SharePointAuth(reason))
}

/// Sign-in endpoint at the tenant root that redeems a token for cookies.
pub fn signin_url(site_root: &str) -> String {
    format!(
        "{}/_forms/default.aspx?wa=wsignin1.0",
        site_root.trim_end_matches('/')
    )
}

fn xml_escape(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}
