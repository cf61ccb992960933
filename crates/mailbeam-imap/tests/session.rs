//! End-to-end session tests over scripted transports.
//!
//! Each test drives the engine against a mock stream that asserts the
//! exact bytes written and feeds back canned server responses, so both
//! directions of the wire protocol are checked.

use tokio_test::io::{Builder, Mock};

use mailbeam_imap::{
    mutf7, Capability, Config, ConnectionState, Engine, Error, Flag, Mechanism, SearchKey,
};

fn config() -> Config {
    Config::builder("localhost")
        .credentials("tim", "tanstaaftanstaaf")
        .build()
}

async fn engine(mock: Mock) -> Engine<Mock> {
    Engine::from_stream(mock, config()).await.unwrap()
}

#[tokio::test]
async fn greeting_with_inline_capabilities() {
    let mock = Builder::new()
        .read(b"* OK [CAPABILITY IMAP4rev1 AUTH=PLAIN] hi\r\n")
        .build();

    let engine = engine(mock).await;
    assert_eq!(engine.state(), ConnectionState::NotAuthenticated);
    assert!(engine.has_capability(&Capability::Imap4Rev1));
    assert!(engine.has_capability(&Capability::Auth("PLAIN".to_string())));
    assert_eq!(engine.capabilities().len(), 2);
}

#[tokio::test]
async fn greeting_without_capabilities_triggers_capability_command() {
    let mock = Builder::new()
        .read(b"* OK hello\r\n")
        .write(b"c0000001 CAPABILITY\r\n")
        .read(b"* CAPABILITY IMAP4rev1 STARTTLS\r\nc0000001 OK done\r\n")
        .build();

    let engine = engine(mock).await;
    assert_eq!(engine.state(), ConnectionState::NotAuthenticated);
    assert!(engine.has_capability(&Capability::Imap4Rev1));
    assert!(engine.has_capability(&Capability::StartTls));
}

#[tokio::test]
async fn preauth_greeting_skips_authentication() {
    let mock = Builder::new()
        .read(b"* PREAUTH [CAPABILITY IMAP4rev1] ok\r\n")
        .build();

    let mut engine = engine(mock).await;
    assert_eq!(engine.state(), ConnectionState::Authenticated);

    // Already authenticated: no AUTHENTICATE may be issued. The mock
    // panics on any unscripted write, so this must be a no-op.
    engine.authenticate().await.unwrap();
    assert_eq!(engine.state(), ConnectionState::Authenticated);
}

#[tokio::test]
async fn bye_greeting_is_rejected() {
    let mock = Builder::new().read(b"* BYE overloaded\r\n").build();
    let result = Engine::from_stream(mock, config()).await;
    assert!(matches!(result, Err(Error::ServerRejected(text)) if text == "overloaded"));
}

#[tokio::test]
async fn missing_imap4rev1_is_fatal() {
    let mock = Builder::new()
        .read(b"* OK [CAPABILITY IMAP9000] hi\r\n")
        .build();
    let result = Engine::from_stream(mock, config()).await;
    assert!(matches!(result, Err(Error::UnsupportedProtocol)));
}

#[tokio::test]
async fn cram_md5_authentication() {
    // The RFC 2195 example exchange, verbatim on the wire.
    let mock = Builder::new()
        .read(b"* OK [CAPABILITY IMAP4rev1 AUTH=CRAM-MD5] hi\r\n")
        .write(b"c0000001 AUTHENTICATE CRAM-MD5\r\n")
        .read(b"+ PDE4OTYuNjk3MTcwOTUyQHBvc3RvZmZpY2UucmVzdG9uLm1jaS5uZXQ+\r\n")
        .write(b"dGltIGI5MTNhNjAyYzdlZGE3YTQ5NWI0ZTZlNzMzNGQzODkw\r\n")
        .read(b"c0000001 OK\r\n")
        .build();

    let mut engine = engine(mock).await;
    engine.authenticate().await.unwrap();
    assert_eq!(engine.state(), ConnectionState::Authenticated);
}

#[tokio::test]
async fn plain_authentication_and_capability_refresh() {
    let mock = Builder::new()
        .read(b"* OK [CAPABILITY IMAP4rev1 AUTH=PLAIN] hi\r\n")
        .write(b"c0000001 AUTHENTICATE PLAIN\r\n")
        .read(b"+ \r\n")
        .write(b"AHRpbQB0YW5zdGFhZnRhbnN0YWFm\r\n")
        .read(b"c0000001 OK [CAPABILITY IMAP4rev1 STARTTLS] done\r\n")
        .build();

    let mut engine = engine(mock).await;
    engine.authenticate().await.unwrap();
    assert_eq!(engine.state(), ConnectionState::Authenticated);
    // The tagged OK carried a capability refresh.
    assert!(engine.has_capability(&Capability::StartTls));
}

#[tokio::test]
async fn cram_md5_preferred_over_plain() {
    let mock = Builder::new()
        .read(b"* OK [CAPABILITY IMAP4rev1 AUTH=PLAIN AUTH=CRAM-MD5] hi\r\n")
        .write(b"c0000001 AUTHENTICATE CRAM-MD5\r\n")
        .read(b"+ PDE4OTYuNjk3MTcwOTUyQHBvc3RvZmZpY2UucmVzdG9uLm1jaS5uZXQ+\r\n")
        .write(b"dGltIGI5MTNhNjAyYzdlZGE3YTQ5NWI0ZTZlNzMzNGQzODkw\r\n")
        .read(b"c0000001 OK\r\n")
        .build();

    let mut engine = engine(mock).await;
    engine.authenticate().await.unwrap();
}

#[tokio::test]
async fn no_supported_mechanism_fails() {
    let mock = Builder::new()
        .read(b"* OK [CAPABILITY IMAP4rev1 AUTH=XOAUTH2] hi\r\n")
        .build();

    let mut engine = engine(mock).await;
    let result = engine.authenticate().await;
    assert!(matches!(result, Err(Error::NoSupportedAuthMechanism)));
    assert_eq!(engine.state(), ConnectionState::NotAuthenticated);
}

#[tokio::test]
async fn fixed_mechanism_must_be_advertised() {
    let mock = Builder::new()
        .read(b"* OK [CAPABILITY IMAP4rev1 AUTH=PLAIN] hi\r\n")
        .build();

    let config = Config::builder("localhost")
        .credentials("tim", "secret")
        .auth_mechanism(Mechanism::CramMd5)
        .build();
    let mut engine = Engine::from_stream(mock, config).await.unwrap();

    let result = engine.authenticate().await;
    assert!(matches!(
        result,
        Err(Error::UnsupportedAuthMechanism(mech)) if mech == "CRAM-MD5"
    ));
}

#[tokio::test]
async fn login_command() {
    let mock = Builder::new()
        .read(b"* OK [CAPABILITY IMAP4rev1] hi\r\n")
        .write(b"c0000001 LOGIN tim tanstaaftanstaaf\r\n")
        .read(b"c0000001 OK LOGIN completed\r\n")
        .build();

    let mut engine = engine(mock).await;
    engine.login().await.unwrap();
    assert_eq!(engine.state(), ConnectionState::Authenticated);
}

#[tokio::test]
async fn list_round_trip() {
    let mock = Builder::new()
        .read(b"* PREAUTH [CAPABILITY IMAP4rev1] ok\r\n")
        .write(b"c0000001 LIST \"\" \"*\"\r\n")
        .read(b"* LIST (\\HasNoChildren) \"/\" \"INBOX\"\r\nc0000001 OK LIST done\r\n")
        .build();

    let mut engine = engine(mock).await;
    let listings = engine.list("", "*").await.unwrap();

    assert_eq!(listings.len(), 1);
    let inbox = &listings[0];
    assert_eq!(
        inbox.attributes,
        vec![mailbeam_imap::MailboxAttribute::HasNoChildren]
    );
    assert_eq!(inbox.delimiter, Some('/'));
    assert_eq!(inbox.name, "INBOX");
}

#[tokio::test]
async fn list_decodes_encoded_names() {
    let mock = Builder::new()
        .read(b"* PREAUTH [CAPABILITY IMAP4rev1] ok\r\n")
        .write(b"c0000001 LIST \"\" \"*\"\r\n")
        .read(b"* LIST () \"/\" \"m&AOk-tallo&AO8-de\"\r\nc0000001 OK done\r\n")
        .build();

    let mut engine = engine(mock).await;
    let listings = engine.list("", "*").await.unwrap();
    assert_eq!(listings[0].name, "m\u{e9}tallo\u{ef}de");
}

#[tokio::test]
async fn create_with_literal_name() {
    // The announcement must be flushed, the continuation awaited, and
    // only then the payload sent; the scripted mock enforces the order.
    let mock = Builder::new()
        .read(b"* PREAUTH [CAPABILITY IMAP4rev1] ok\r\n")
        .write(b"c0000001 CREATE {6}\r\n")
        .read(b"+ go\r\n")
        .write(b"&AOk-!\r\n")
        .read(b"c0000001 OK CREATE completed\r\n")
        .build();

    let mut engine = engine(mock).await;
    engine.create("\u{e9}!").await.unwrap();
}

#[tokio::test]
async fn no_during_literal_aborts_payload() {
    // The mock would panic if the payload bytes were written.
    let mock = Builder::new()
        .read(b"* PREAUTH [CAPABILITY IMAP4rev1] ok\r\n")
        .write(b"c0000001 CREATE {6}\r\n")
        .read(b"c0000001 NO name invalid\r\n")
        .build();

    let mut engine = engine(mock).await;
    let result = engine.create("\u{e9}!").await;
    assert!(matches!(result, Err(Error::No(text)) if text == "name invalid"));

    // A NO is a command-level failure; the connection stays usable.
    assert_eq!(engine.state(), ConnectionState::Authenticated);
}

#[tokio::test]
async fn ok_during_literal_is_fatal() {
    let mock = Builder::new()
        .read(b"* PREAUTH [CAPABILITY IMAP4rev1] ok\r\n")
        .write(b"c0000001 CREATE {6}\r\n")
        .read(b"c0000001 OK too eager\r\n")
        .build();

    let mut engine = engine(mock).await;
    let result = engine.create("\u{e9}!").await;
    assert!(matches!(result, Err(Error::UnexpectedOkDuringLiteral)));

    let result = engine.noop().await;
    assert!(matches!(result, Err(Error::ConnectionDown)));
}

#[tokio::test]
async fn bye_during_command_poisons_connection() {
    let mock = Builder::new()
        .read(b"* PREAUTH [CAPABILITY IMAP4rev1] ok\r\n")
        .write(b"c0000001 LIST \"\" \"*\"\r\n")
        .read(b"* BYE server going down\r\n")
        .build();

    let mut engine = engine(mock).await;
    let result = engine.list("", "*").await;
    assert!(matches!(
        result,
        Err(Error::ServerShuttingDown(text)) if text == "server going down"
    ));

    let result = engine.list("", "*").await;
    assert!(matches!(result, Err(Error::ConnectionDown)));
}

#[tokio::test]
async fn select_folds_mailbox_state() {
    let mock = Builder::new()
        .read(b"* PREAUTH [CAPABILITY IMAP4rev1] ok\r\n")
        .write(b"c0000001 SELECT INBOX\r\n")
        .read(
            b"* FLAGS (\\Answered \\Flagged \\Deleted \\Seen \\Draft)\r\n\
              * 172 EXISTS\r\n\
              * 1 RECENT\r\n\
              * OK [UNSEEN 12] first unseen\r\n\
              * OK [UIDVALIDITY 3857529045] UIDs valid\r\n\
              * OK [UIDNEXT 4392] predicted\r\n\
              * OK [PERMANENTFLAGS (\\Deleted \\Seen \\*)] limited\r\n\
              c0000001 OK [READ-WRITE] SELECT completed\r\n",
        )
        .build();

    let mut engine = engine(mock).await;
    let view = engine.select("INBOX").await.unwrap();

    assert_eq!(engine.state(), ConnectionState::Selected);
    assert_eq!(view.exists, 172);
    assert_eq!(view.recent, 1);
    assert_eq!(view.unseen, Some(12));
    assert_eq!(view.uid_validity, Some(3_857_529_045));
    assert_eq!(view.uid_next, Some(4392));
    assert_eq!(view.flags.len(), 5);
    assert_eq!(
        view.permanent_flags,
        vec![Flag::Deleted, Flag::Seen, Flag::Wildcard]
    );
    assert!(!view.read_only);
}

#[tokio::test]
async fn examine_is_read_only() {
    let mock = Builder::new()
        .read(b"* PREAUTH [CAPABILITY IMAP4rev1] ok\r\n")
        .write(b"c0000001 EXAMINE Archive\r\n")
        .read(b"* 3 EXISTS\r\n* 0 RECENT\r\nc0000001 OK [READ-ONLY] EXAMINE completed\r\n")
        .build();

    let mut engine = engine(mock).await;
    let view = engine.examine("Archive").await.unwrap();
    assert!(view.read_only);
    assert_eq!(view.exists, 3);
}

#[tokio::test]
async fn failed_select_deselects() {
    let mock = Builder::new()
        .read(b"* PREAUTH [CAPABILITY IMAP4rev1] ok\r\n")
        .write(b"c0000001 SELECT INBOX\r\n")
        .read(b"* 1 EXISTS\r\n* 0 RECENT\r\nc0000001 OK SELECT completed\r\n")
        .write(b"c0000002 SELECT missing\r\n")
        .read(b"c0000002 NO no such mailbox\r\n")
        .build();

    let mut engine = engine(mock).await;
    engine.select("INBOX").await.unwrap();
    assert_eq!(engine.state(), ConnectionState::Selected);

    let result = engine.select("missing").await;
    assert!(matches!(result, Err(Error::No(_))));
    assert_eq!(engine.state(), ConnectionState::Authenticated);
}

#[tokio::test]
async fn close_returns_to_authenticated() {
    let mock = Builder::new()
        .read(b"* PREAUTH [CAPABILITY IMAP4rev1] ok\r\n")
        .write(b"c0000001 SELECT INBOX\r\n")
        .read(b"* 1 EXISTS\r\n* 0 RECENT\r\nc0000001 OK SELECT completed\r\n")
        .write(b"c0000002 CLOSE\r\n")
        .read(b"c0000002 OK CLOSE completed\r\n")
        .build();

    let mut engine = engine(mock).await;
    engine.select("INBOX").await.unwrap();
    engine.close().await.unwrap();
    assert_eq!(engine.state(), ConnectionState::Authenticated);
}

#[tokio::test]
async fn search_concatenates_result_sets() {
    let mock = Builder::new()
        .read(b"* PREAUTH [CAPABILITY IMAP4rev1] ok\r\n")
        .write(b"c0000001 SEARCH UNSEEN\r\n")
        .read(b"* SEARCH 2 84 882\r\n* SEARCH 901\r\nc0000001 OK SEARCH completed\r\n")
        .build();

    let mut engine = engine(mock).await;
    let found = engine.search(None, SearchKey::unseen()).await.unwrap();
    assert_eq!(found, vec![2, 84, 882, 901]);
}

#[tokio::test]
async fn search_with_parsed_key_and_charset() {
    let mock = Builder::new()
        .read(b"* PREAUTH [CAPABILITY IMAP4rev1] ok\r\n")
        .write(b"c0000001 SEARCH CHARSET UTF-8 FROM bob SINCE 01-Feb-2016\r\n")
        .read(b"* SEARCH 7\r\nc0000001 OK done\r\n")
        .build();

    let key = SearchKey::parse("from bob since 2016-02-01").unwrap();
    let mut engine = engine(mock).await;
    let found = engine.search(Some("UTF-8"), key).await.unwrap();
    assert_eq!(found, vec![7]);
}

#[tokio::test]
async fn unknown_untagged_responses_are_skipped() {
    let mock = Builder::new()
        .read(b"* PREAUTH [CAPABILITY IMAP4rev1] ok\r\n")
        .write(b"c0000001 NOOP\r\n")
        .read(b"* XJUNK 1 2 3\r\nc0000001 OK NOOP completed\r\n")
        .build();

    let mut engine = engine(mock).await;
    engine.noop().await.unwrap();
}

#[tokio::test]
async fn tags_increase_across_commands() {
    let mock = Builder::new()
        .read(b"* PREAUTH [CAPABILITY IMAP4rev1] ok\r\n")
        .write(b"c0000001 NOOP\r\n")
        .read(b"c0000001 OK\r\n")
        .write(b"c0000002 NOOP\r\n")
        .read(b"c0000002 OK\r\n")
        .write(b"c0000003 SUBSCRIBE news\r\n")
        .read(b"c0000003 OK\r\n")
        .build();

    let mut engine = engine(mock).await;
    engine.noop().await.unwrap();
    engine.noop().await.unwrap();
    engine.subscribe("news").await.unwrap();
}

#[tokio::test]
async fn logout_consumes_bye() {
    let mock = Builder::new()
        .read(b"* PREAUTH [CAPABILITY IMAP4rev1] ok\r\n")
        .write(b"c0000001 LOGOUT\r\n")
        .read(b"* BYE see ya\r\nc0000001 OK LOGOUT completed\r\n")
        .build();

    let mut engine = engine(mock).await;
    engine.logout().await.unwrap();
    assert_eq!(engine.state(), ConnectionState::Logout);

    let result = engine.noop().await;
    assert!(matches!(result, Err(Error::ConnectionDown)));
}

#[tokio::test]
async fn rename_and_management_commands() {
    let mock = Builder::new()
        .read(b"* PREAUTH [CAPABILITY IMAP4rev1] ok\r\n")
        .write(b"c0000001 RENAME old \"new name\"\r\n")
        .read(b"c0000001 OK RENAME completed\r\n")
        .write(b"c0000002 DELETE old\r\n")
        .read(b"c0000002 OK DELETE completed\r\n")
        .write(b"c0000003 UNSUBSCRIBE news\r\n")
        .read(b"c0000003 OK UNSUBSCRIBE completed\r\n")
        .build();

    let mut engine = engine(mock).await;
    engine.rename("old", "new name").await.unwrap();
    engine.delete("old").await.unwrap();
    engine.unsubscribe("news").await.unwrap();
}

#[test]
fn modified_utf7_known_pairs() {
    assert_eq!(mutf7::encode("\u{2190}\u{a0}\u{2192}"), "&IZAAoCGS-");
    assert_eq!(mutf7::decode("&AOk-").unwrap(), "\u{e9}");
    assert!(matches!(mutf7::decode("&"), Err(Error::MalformedEncoding)));
}
