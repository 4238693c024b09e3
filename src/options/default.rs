pub(super) const HOST: &str = "localhost";

pub(super) const PORT: u16 = 3306;

pub(super) const CHARSET: &str = "utf8mb4";

pub(super) fn username() -> String {
    whoami::username()
}
