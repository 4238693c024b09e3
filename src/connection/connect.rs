//! Implements the connection phase.
//!
//! The connection phase performs these tasks:
//!
//! -   exchange the capabilities of client and server
//! -   set up a TLS communication channel if requested
//! -   authenticate the client against the server
//!
//! The server may immediately send an ERR packet and finish the handshake
//! or send a `Handshake` greeting.
//!
//! https://dev.mysql.com/doc/internals/en/connection-phase.html
//!
use std::cmp::min;

use crate::error::{Error, Result};
use crate::io::BufStream;
use crate::net;
use crate::options::MySqlConnectOptions;
use crate::protocol::connect::{Handshake, HandshakeResponse, SslRequest};
use crate::protocol::{Capabilities, MAX_PACKET_SIZE};

use super::{auth, MySqlConnection, INITIAL_CHARSET};

// max packet size declared in the handshake response; the working write
// bound is negotiated after authentication instead
const DECLARED_MAX_PACKET_SIZE: u32 = 1024;

impl MySqlConnection {
    pub(crate) fn establish(options: &MySqlConnectOptions) -> Result<Self> {
        let stream = net::dial(&options.network, &options.address, options.connect_timeout)?;

        let mut conn = Self::new(
            BufStream::new(stream),
            options.is_secure(),
            options.parse_time,
            options.strict,
        );

        if let Err(err) = conn.handshake(options) {
            // authentication failed, so the server has closed or will close
            // the socket; do not send COM_QUIT, just tear down
            // https://dev.mysql.com/doc/internals/en/authentication-fails.html
            conn.close_hard();

            return Err(err);
        }

        conn.handshake_complete = true;

        if let Err(err) = conn.finalize(options) {
            // authenticated, so part politely
            let _ = conn.close_with_quit();

            return Err(err);
        }

        Ok(conn)
    }

    fn handshake(&mut self, options: &MySqlConnectOptions) -> Result<()> {
        self.stream.set_read_timeout(options.read_timeout)?;
        self.stream.set_write_timeout(options.write_timeout)?;

        let handshake: Handshake = self.recv_packet()?.decode()?;

        tracing::debug!(
            protocol_version = handshake.protocol_version,
            connection_id = handshake.connection_id,
            server_version = &*handshake.server_version,
            "received server greeting"
        );

        self.connection_id = handshake.connection_id;
        self.server_version = handshake.server_version.clone();
        self.status = handshake.status;

        // operate under the rules both sides understand
        self.capabilities &= handshake.capabilities;

        if !self.capabilities.contains(Capabilities::PROTOCOL_41) {
            return Err(err_protocol!("server does not support the 4.1 protocol"));
        }

        if options.database.is_some()
            && handshake.capabilities.contains(Capabilities::CONNECT_WITH_DB)
        {
            self.capabilities |= Capabilities::CONNECT_WITH_DB;
        }

        if options.send_attributes
            && handshake.capabilities.contains(Capabilities::CONNECT_ATTRS)
        {
            self.capabilities |= Capabilities::CONNECT_ATTRS;
        }

        if options.use_tls {
            if !handshake.capabilities.contains(Capabilities::SSL) {
                return Err(Error::tls("server does not support TLS"));
            }

            self.capabilities |= Capabilities::SSL;

            // half a handshake response, then the channel goes dark and
            // re-emerges encrypted
            self.write_packet(SslRequest {
                max_packet_size: DECLARED_MAX_PACKET_SIZE,
                charset: INITIAL_CHARSET,
            })?;
            self.flush()?;

            let host = options.host().to_owned();
            self.stream.map_stream(|stream| net::tls_upgrade(stream, &host))?;

            tracing::debug!("upgraded connection to TLS");
        }

        let negotiation = auth::negotiate(&handshake, options)?;

        self.write_packet(HandshakeResponse {
            database: options.get_database(),
            max_packet_size: DECLARED_MAX_PACKET_SIZE,
            charset: INITIAL_CHARSET,
            username: options.get_username(),
            auth_plugin_name: &negotiation.plugin_name,
            auth_response: &negotiation.initial_response,
        })?;
        self.flush()?;

        self.handle_auth_result(negotiation.plugin, &negotiation.original_challenge, options)
    }

    /// Settle the session's packet-size bounds and apply post-connect
    /// configuration; a failure here closes the session.
    fn finalize(&mut self, options: &MySqlConnectOptions) -> Result<()> {
        self.max_allowed_packet = match options.max_allowed_packet {
            Some(max) => max,

            None => self
                .get_system_var("max_allowed_packet")?
                .and_then(|value| atoi::atoi::<u32>(value.as_bytes()))
                .map(|value| value.saturating_sub(1))
                .ok_or_else(|| {
                    Error::configuration("server reported no usable max_allowed_packet")
                })?,
        };

        self.max_write_size = min(self.max_allowed_packet, MAX_PACKET_SIZE as u32);

        match options.collation.as_deref() {
            Some(collation) => {
                self.execute(&format!("SET NAMES {} COLLATE {}", options.charset, collation))?;
            }

            None => {
                self.execute(&format!("SET NAMES {}", options.charset))?;
            }
        }

        for (name, value) in &options.session_variables {
            self.execute(&format!("SET {name} = {value}"))?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use crate::error::Error;
    use crate::mock::{Mock, MockServer};
    use crate::MySqlConnectOptions;

    const SRV_HANDSHAKE_DEFAULT_OLD_AUTH: &[u8] = b"\n5.5.5-10.5.8-MariaDB-1:10.5.8+maria~focal\0)\0\0\04bo+$r4H\0\xfe\xf7-\x02\0\xff\x81\x15\0\0\0\0\0\0\x0f\0\0\0O5X>j}Ur]Y)^\0mysql_old_password\0";
    const SRV_HANDSHAKE_DEFAULT_NATIVE_AUTH: &[u8] = b"\n5.5.5-10.5.8-MariaDB-1:10.5.8+maria~focal\0)\0\0\04bo+$r4H\0\xfe\xf7-\x02\0\xff\x81\x15\0\0\0\0\0\0\x0f\0\0\0O5X>j}Ur]Y)^\0mysql_native_password\0";
    const SRV_HANDSHAKE_DEFAULT_CACHING_SHA2_AUTH: &[u8] = b"\n8.0.22\0\x08\0\0\0TIbl}%U#\0\xff\xff\xff\x02\0\xff\xc7\x15\0\0\0\0\0\0\0\0\0\0\x06\x12\x0e`5\x1b\x12\x0b\x13\x06_\x19\0caching_sha2_password\0";

    const SRV_PUBLIC_KEY: &[u8] = b"\x01-----BEGIN PUBLIC KEY-----\nMIIBIjANBgkqhkiG9w0BAQEFAAOCAQ8AMIIBCgKCAQEAwnXi3nr9TmN+NF49A3Y7\nUBnAVhApNJy2cmuf/y6vFM9eHFu5T80Ij1qYc6c79oAGA8nNNCFQL+0j5De88cln\nKrlzq/Ab3U+j5SqgNwk//F6Y3iyjV4L7feSDqjpcheFzkjEslbm/yoRwQ78AAU6s\nqA0hcFuh66mcvnotDrvZAGQ8U2EbbZa6oiR3wrgbzifSKq767g65zIrCpoyxzKMH\nAETSDIaMKpFio4dRATKT5ASQtPoIyxSBmjRtc22sqlhEeiejEMsJzd6Bliuait+A\nkTXL6G1Tbam26Dok/L88CnTAWAkLwTA3bjPcS8Zl9gTsJvoiMuwW1UPEVV/aJ11Z\n/wIDAQAB\n-----END PUBLIC KEY-----\n";
    const SRV_AUTH_OK: &[u8] = b"\0\0\0\x02\0\0\0";
    const SRV_AUTH_MORE_CONTINUE: &[u8] = b"\x01\x04";
    const SRV_AUTH_MORE_OK: &[u8] = b"\x01\x03";
    const SRV_SWITCH_NATIVE_AUTH: &[u8] =
        b"\xfemysql_native_password\0\r.89j]CpA3Ov~\x1de\\/\x15,\r\0";
    const SRV_ERR_ACCESS_DENIED: &[u8] =
        b"\xff\x15\x04#28000Access denied for user 'root'@'localhost' (using password: YES)";

    const RES_HANDSHAKE_NATIVE_AUTH: &[u8] = b"P\0\0\x01\x04\xa3(\x01\0\x04\0\0-\0\0\0\0\0\0\0\0\0\0\0\0\0\0\0\0\0\0\0\0\0\0\0root\0\x14P\xaf\xf1\x12,\xe9\xad\xea\x7f\xa0\n\xcd\xa2\xb5<\x17\xa5\xc9J\xd0mysql_native_password\0";
    const RES_HANDSHAKE_EMPTY_AUTH: &[u8] = b"<\0\0\x01\x04\xa3(\x01\0\x04\0\0-\0\0\0\0\0\0\0\0\0\0\0\0\0\0\0\0\0\0\0\0\0\0\0root\0\0mysql_native_password\0";
    const RES_HANDSHAKE_CACHING_SHA2_AUTH: &[u8] = b"\\\0\0\x01\x05\xa3(\x01\0\x04\0\0-\0\0\0\0\0\0\0\0\0\0\0\0\0\0\0\0\0\0\0\0\0\0\0root\0 \x9d\x85T\x15\xfe\xa9u\x13\x02&\x9dlG\x17\x98\x1b`\x8a\x96\xfcI\x19\x17\xe0(I8\xba\xd7\xfax\xa9caching_sha2_password\0";

    const RES_ASK_RSA_KEY: &[u8] = b"\x01\0\0\x03\x02";
    const RES_NATIVE_SCRAMBLE: &[u8] =
        b"\x14\0\0\x031.Z\x95JON\x81\x9ak\xc7\xba\xe6{L\x0f\xe8\x03N\xef";
    const RES_ORIGINAL_CHALLENGE_SCRAMBLE: &[u8] =
        b"\x14\0\0\x03P\xaf\xf1\x12,\xe9\xad\xea\x7f\xa0\n\xcd\xa2\xb5<\x17\xa5\xc9J\xd0";

    const RES_QUERY_MAX_ALLOWED_PACKET: &[u8] = b"\x1c\0\0\0\x03SELECT @@max_allowed_packet";
    const RES_SET_NAMES: &[u8] = b"\x12\0\0\0\x03SET NAMES utf8mb4";
    const RES_QUIT: &[u8] = b"\x01\0\0\0\x01";

    fn options(mock: &MockServer) -> MySqlConnectOptions {
        MySqlConnectOptions::new()
            .network("mock")
            .address(mock.port().to_string())
            .username("root")
            .send_attributes(false)
            .max_allowed_packet(4 * 1024 * 1024)
    }

    // scripted replies to the post-auth `SET NAMES`
    fn script_set_names(mock: &mut MockServer) {
        mock.write_packet(1, SRV_AUTH_OK);
    }

    #[test]
    fn should_connect_default_native_auth() -> anyhow::Result<()> {
        let mut mock = Mock::stream();

        mock.write_packet(0, SRV_HANDSHAKE_DEFAULT_NATIVE_AUTH);
        mock.write_packet(2, SRV_AUTH_OK);
        script_set_names(&mut mock);

        let conn = options(&mock).password("password").connect()?;

        assert_eq!(mock.read_message(), RES_HANDSHAKE_NATIVE_AUTH);
        assert_eq!(mock.read_message(), RES_SET_NAMES);

        assert_eq!(conn.server_version(), "5.5.5-10.5.8-MariaDB-1:10.5.8+maria~focal");
        assert_eq!(conn.connection_id(), 41);
        assert_eq!(conn.max_allowed_packet(), 4 * 1024 * 1024);
        assert_eq!(conn.max_write_size(), 4 * 1024 * 1024);

        Ok(())
    }

    #[test]
    fn should_connect_empty_auth() -> anyhow::Result<()> {
        let mut mock = Mock::stream();

        mock.write_packet(0, SRV_HANDSHAKE_DEFAULT_NATIVE_AUTH);
        mock.write_packet(2, SRV_AUTH_OK);
        script_set_names(&mut mock);

        let _conn = options(&mock).connect()?;

        assert_eq!(mock.read_message(), RES_HANDSHAKE_EMPTY_AUTH);

        Ok(())
    }

    #[test]
    fn should_connect_caching_sha2_fast_auth() -> anyhow::Result<()> {
        let mut mock = Mock::stream();

        mock.write_packet(0, SRV_HANDSHAKE_DEFAULT_CACHING_SHA2_AUTH);
        mock.write_packet(2, SRV_AUTH_MORE_OK);
        mock.write_packet(3, SRV_AUTH_OK);
        script_set_names(&mut mock);

        let _conn = options(&mock).password("password").connect()?;

        assert_eq!(mock.read_message(), RES_HANDSHAKE_CACHING_SHA2_AUTH);

        // fast-auth success sends nothing further before the OK
        assert_eq!(mock.read_message(), RES_SET_NAMES);

        Ok(())
    }

    #[test]
    fn should_connect_caching_sha2_full_auth_with_rsa() -> anyhow::Result<()> {
        let mut mock = Mock::stream();

        mock.write_packet(0, SRV_HANDSHAKE_DEFAULT_CACHING_SHA2_AUTH);
        mock.write_packet(2, SRV_AUTH_MORE_CONTINUE);
        mock.write_packet(4, SRV_PUBLIC_KEY);
        mock.write_packet(6, SRV_AUTH_OK);
        script_set_names(&mut mock);

        let _conn = options(&mock).password("password").connect()?;

        assert_eq!(mock.read_message(), RES_HANDSHAKE_CACHING_SHA2_AUTH);
        assert_eq!(mock.read_message(), RES_ASK_RSA_KEY);

        // OAEP padding is randomized; assert the frame, not the bytes
        let encrypted = mock.read_message();
        assert_eq!(encrypted.len(), 4 + 256);
        assert_eq!(&encrypted[..4], b"\x00\x01\0\x05");

        Ok(())
    }

    #[test]
    fn should_connect_switch_native_auth() -> anyhow::Result<()> {
        let mut mock = Mock::stream();

        mock.write_packet(0, SRV_HANDSHAKE_DEFAULT_CACHING_SHA2_AUTH);
        mock.write_packet(2, SRV_SWITCH_NATIVE_AUTH);
        mock.write_packet(4, SRV_AUTH_OK);
        script_set_names(&mut mock);

        let _conn = options(&mock).password("password").connect()?;

        assert_eq!(mock.read_message(), RES_HANDSHAKE_CACHING_SHA2_AUTH);
        assert_eq!(mock.read_message(), RES_NATIVE_SCRAMBLE);

        Ok(())
    }

    #[test]
    fn should_connect_after_two_switch_requests() -> anyhow::Result<()> {
        let mut mock = Mock::stream();

        mock.write_packet(0, SRV_HANDSHAKE_DEFAULT_CACHING_SHA2_AUTH);
        mock.write_packet(2, SRV_SWITCH_NATIVE_AUTH);
        mock.write_packet(4, SRV_SWITCH_NATIVE_AUTH);
        mock.write_packet(6, SRV_AUTH_OK);
        script_set_names(&mut mock);

        let _conn = options(&mock).password("password").connect()?;

        let _response = mock.read_message();

        // one re-invocation per switch, nothing more
        assert_eq!(mock.read_message(), RES_NATIVE_SCRAMBLE);
        assert_eq!(
            mock.read_message(),
            // same scramble one sequence id later
            [&b"\x14\0\0\x05"[..], &RES_NATIVE_SCRAMBLE[4..]].concat()
        );
        assert_eq!(mock.read_message(), RES_SET_NAMES);

        Ok(())
    }

    #[test]
    fn should_fall_back_on_unknown_plugin_and_retry_original_challenge() -> anyhow::Result<()> {
        let mut mock = Mock::stream();

        // the greeting declares a plugin we do not know; the response must
        // advertise the default plugin with an empty auth response
        mock.write_packet(0, SRV_HANDSHAKE_DEFAULT_OLD_AUTH);

        // the server answers with a legacy switch; the retry must scramble
        // the *original* greeting challenge
        mock.write_packet(2, b"\xfe");
        mock.write_packet(4, SRV_AUTH_OK);
        script_set_names(&mut mock);

        let _conn = options(&mock).password("password").connect()?;

        assert_eq!(mock.read_message(), RES_HANDSHAKE_EMPTY_AUTH);
        assert_eq!(mock.read_message(), RES_ORIGINAL_CHALLENGE_SCRAMBLE);

        Ok(())
    }

    #[test]
    fn should_not_connect_on_err_greeting() {
        let mut mock = Mock::stream();

        mock.write_packet(0, SRV_ERR_ACCESS_DENIED);

        let err = options(&mock).password("password").connect().unwrap_err();

        assert!(matches!(err, Error::Database(_)));

        // no handshake response, and no COM_QUIT either
        assert!(mock.try_read_message().is_none());
    }

    #[test]
    fn should_not_send_quit_after_auth_failure() {
        let mut mock = Mock::stream();

        mock.write_packet(0, SRV_HANDSHAKE_DEFAULT_NATIVE_AUTH);
        mock.write_packet(2, SRV_ERR_ACCESS_DENIED);

        let err = options(&mock).password("wrong").connect().unwrap_err();

        assert_eq!(
            err.to_string(),
            "error returned from database: 1045 (28000): Access denied for user 'root'@'localhost' (using password: YES)"
        );

        // exactly one message crossed the wire: the handshake response
        let _response = mock.read_message();
        assert!(mock.try_read_message().is_none());
    }

    #[test]
    fn should_fail_on_unknown_switch_plugin() {
        let mut mock = Mock::stream();

        mock.write_packet(0, SRV_HANDSHAKE_DEFAULT_NATIVE_AUTH);
        mock.write_packet(2, b"\xfeauth_gssapi_client\0challengechallenge\0");

        let err = options(&mock).password("password").connect().unwrap_err();

        assert_eq!(
            err.to_string(),
            "error negotiating authentication: unknown authentication plugin: auth_gssapi_client"
        );
    }

    #[test]
    fn should_bound_pathological_switch_loops() {
        let mut mock = Mock::stream();

        mock.write_packet(0, SRV_HANDSHAKE_DEFAULT_NATIVE_AUTH);

        // a server that never stops switching
        for round in 0..10_u8 {
            mock.write_packet(2 * round + 2, SRV_SWITCH_NATIVE_AUTH);
        }

        let err = options(&mock).password("password").connect().unwrap_err();

        assert!(err.to_string().contains("did not terminate"));
    }

    #[test]
    fn should_discover_max_allowed_packet() -> anyhow::Result<()> {
        let mut mock = Mock::stream();

        mock.write_packet(0, SRV_HANDSHAKE_DEFAULT_NATIVE_AUTH);
        mock.write_packet(2, SRV_AUTH_OK);

        // result set for SELECT @@max_allowed_packet: column count, one
        // column definition, one row, terminal OK (DEPRECATE_EOF)
        mock.write_packet(1, b"\x01");
        mock.write_packet(
            2,
            b"\x03def\0\0\0\x14@@max_allowed_packet\0\x0c\x3f\0\x15\0\0\0\x08\x80\0\0\0\0",
        );
        mock.write_packet(3, b"\x071048576");
        mock.write_packet(4, b"\xfe\0\0\x02\0");

        script_set_names(&mut mock);

        let conn = MySqlConnectOptions::new()
            .network("mock")
            .address(mock.port().to_string())
            .username("root")
            .password("password")
            .send_attributes(false)
            .connect()?;

        let _response = mock.read_message();
        assert_eq!(mock.read_message(), RES_QUERY_MAX_ALLOWED_PACKET);

        // (value - 1), and small enough to be the write bound as-is
        assert_eq!(conn.max_allowed_packet(), 1_048_575);
        assert_eq!(conn.max_write_size(), 1_048_575);

        Ok(())
    }

    #[test]
    fn should_clamp_max_write_size_to_protocol_maximum() -> anyhow::Result<()> {
        let mut mock = Mock::stream();

        mock.write_packet(0, SRV_HANDSHAKE_DEFAULT_NATIVE_AUTH);
        mock.write_packet(2, SRV_AUTH_OK);
        script_set_names(&mut mock);

        let conn = options(&mock)
            .password("password")
            .max_allowed_packet(32 * 1024 * 1024)
            .connect()?;

        assert_eq!(conn.max_allowed_packet(), 32 * 1024 * 1024);
        assert_eq!(conn.max_write_size(), 0xff_ff_ff);

        Ok(())
    }

    #[test]
    fn should_apply_session_variables() -> anyhow::Result<()> {
        let mut mock = Mock::stream();

        mock.write_packet(0, SRV_HANDSHAKE_DEFAULT_NATIVE_AUTH);
        mock.write_packet(2, SRV_AUTH_OK);
        script_set_names(&mut mock);

        // one OK per configured variable
        mock.write_packet(1, SRV_AUTH_OK);

        let _conn = options(&mock)
            .password("password")
            .session_variable("sql_mode", "'STRICT_ALL_TABLES'")
            .connect()?;

        let _response = mock.read_message();
        let _set_names = mock.read_message();

        assert_eq!(
            mock.read_message(),
            b"#\0\0\0\x03SET sql_mode = 'STRICT_ALL_TABLES'"
        );

        Ok(())
    }

    #[test]
    fn should_quit_politely_when_configuration_fails() {
        let mut mock = Mock::stream();

        mock.write_packet(0, SRV_HANDSHAKE_DEFAULT_NATIVE_AUTH);
        mock.write_packet(2, SRV_AUTH_OK);

        // SET NAMES fails; authentication already succeeded, so the
        // teardown must include COM_QUIT this time
        mock.write_packet(1, b"\xff\x5b\x04#42000Unknown character set");

        let err = options(&mock).password("password").connect().unwrap_err();

        assert!(matches!(err, Error::Database(_)));

        let _response = mock.read_message();
        let _set_names = mock.read_message();

        assert_eq!(mock.read_message(), RES_QUIT);
        assert!(mock.try_read_message().is_none());
    }

    #[test]
    fn should_send_quit_exactly_once_on_close() -> anyhow::Result<()> {
        let mut mock = Mock::stream();

        mock.write_packet(0, SRV_HANDSHAKE_DEFAULT_NATIVE_AUTH);
        mock.write_packet(2, SRV_AUTH_OK);
        script_set_names(&mut mock);

        let conn = options(&mock).password("password").connect()?;

        let _response = mock.read_message();
        let _set_names = mock.read_message();

        conn.close()?;

        assert_eq!(mock.read_message(), RES_QUIT);

        // dropping after close must not emit anything further
        assert!(mock.try_read_message().is_none());

        Ok(())
    }

    #[test]
    fn should_require_tls_provider_when_tls_requested() {
        let mut mock = Mock::stream();

        mock.write_packet(0, SRV_HANDSHAKE_DEFAULT_NATIVE_AUTH);

        let err = options(&mock).password("password").use_tls(true).connect().unwrap_err();

        assert!(matches!(err, Error::Tls(_)));
    }

    #[test]
    fn should_refuse_tls_when_server_lacks_it() {
        let mut mock = Mock::stream();

        // clear the SSL bit in the advertised capabilities
        let mut greeting = SRV_HANDSHAKE_DEFAULT_NATIVE_AUTH.to_vec();
        assert_eq!(&greeting[56..58], b"\xfe\xf7");
        greeting[56..58].copy_from_slice(b"\xfe\xef");

        mock.write_packet(0, &greeting);

        let err = options(&mock).password("password").use_tls(true).connect().unwrap_err();

        assert_eq!(
            err.to_string(),
            "error occurred while attempting to establish a TLS connection: server does not support TLS"
        );
    }

    #[test]
    fn should_time_out_waiting_for_greeting() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let address = listener.local_addr().unwrap().to_string();

        // accept nothing; the greeting never comes
        let err = MySqlConnectOptions::new()
            .address(address)
            .username("root")
            .read_timeout(Duration::from_millis(250))
            .connect()
            .unwrap_err();

        match err {
            Error::Io(err) => assert!(matches!(
                err.kind(),
                std::io::ErrorKind::WouldBlock | std::io::ErrorKind::TimedOut
            )),
            other => panic!("expected an IO timeout, got: {other}"),
        }

        drop(listener);
    }
}
