// Listener module
// Creates the TCP listener with address reuse enabled

use socket2::{Domain, Protocol, Socket, Type};
use tokio::net::TcpListener;

/// Create a `TcpListener` with `SO_REUSEADDR`.
///
/// Address reuse lets a restarted process bind while old sockets from the
/// previous run are still in `TIME_WAIT`. A second live listener on the same
/// port is still refused.
///
/// # Arguments
///
/// * `addr` - The socket address to bind to
/// * `backlog` - Listen queue size (`server.backlog`)
pub fn create_reusable_listener(
    addr: std::net::SocketAddr,
    backlog: u32,
) -> std::io::Result<TcpListener> {
    let domain = if addr.is_ipv4() {
        Domain::IPV4
    } else {
        Domain::IPV6
    };

    let socket = Socket::new(domain, Type::STREAM, Some(Protocol::TCP))?;

    socket.set_reuse_address(true)?;

    // Required before handing the socket to tokio
    socket.set_nonblocking(true)?;

    socket.bind(&addr.into())?;
    socket.listen(i32::try_from(backlog).unwrap_or(i32::MAX))?;

    let std_listener: std::net::TcpListener = socket.into();
    TcpListener::from_std(std_listener)
}
