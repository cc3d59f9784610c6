use radius_client::RadiusClient;
use radius_proto::{codes, Attribute, Code, Packet};
use std::net::{IpAddr, Ipv4Addr};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = std::env::args().collect();

    if args.len() < 4 {
        eprintln!("Usage: {} <username> <password> <secret> [server_ip]", args[0]);
        eprintln!("Example: {} alice hunter2 s3cr3t 127.0.0.1", args[0]);
        std::process::exit(1);
    }

    let username = &args[1];
    let password = &args[2];
    let secret = &args[3];
    let server: IpAddr = args
        .get(4)
        .map(|s| s.parse())
        .unwrap_or(Ok(IpAddr::V4(Ipv4Addr::LOCALHOST)))?;

    let client = RadiusClient::connect(server, secret.clone()).await?;

    let mut request = Packet::access_request(username, password.clone())?;
    request.add_attribute(Attribute::ipv4(
        codes::NAS_IP_ADDRESS,
        Ipv4Addr::new(127, 0, 0, 1),
    )?);

    println!("Sending Access-Request for {} to {}...", username, server);

    let reply = client.communicate(&mut request).await?;
    match reply.code {
        Code::AccessAccept => println!("Authentication SUCCESSFUL (Access-Accept)"),
        Code::AccessReject => println!("Authentication FAILED (Access-Reject)"),
        other => println!("Unexpected response: {}", other),
    }

    for attr in reply.find_all_attributes(codes::REPLY_MESSAGE) {
        if let Ok(message) = attr.as_string() {
            println!("  Message: {}", message);
        }
    }

    Ok(())
}
