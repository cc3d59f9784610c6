use clap::Parser;
use radius_server::{
    Config, LdapAuthenticator, MemoryCredentialStore, RadiusServer, ServerConfig,
    SqlCredentialStore,
};
use std::process;
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// RADIUS authentication and accounting server (RFC 2865 / RFC 2866)
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
#[command(name = "radiusd")]
struct Cli {
    /// Path to configuration file
    #[arg(value_name = "CONFIG", default_value = "config.json")]
    config_path: String,

    /// Validate configuration and exit (doesn't start the server)
    #[arg(short, long)]
    validate: bool,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match Config::from_file(&cli.config_path) {
        Ok(cfg) => cfg,
        Err(e) => {
            init_tracing("info");

            if cli.validate {
                eprintln!("Configuration validation failed: {}", e);
                process::exit(1);
            }

            warn!("Could not load config file from: {}", cli.config_path);
            info!("Creating example configuration at: {}", cli.config_path);

            if let Err(e) = Config::example().to_file(&cli.config_path) {
                error!("Error creating example config: {}", e);
                process::exit(1);
            }

            info!("Please edit {} and restart the server", cli.config_path);
            process::exit(0);
        }
    };

    if cli.validate {
        println!("Configuration validated successfully!");
        println!();
        println!("  Bind: {} (auth {}, acct {})", config.bind_address, config.auth_port, config.acct_port);
        println!("  NAS clients: {}", config.nas_settings.len());
        println!("  Users: {}", config.users.len());
        println!("  LDAP validation: {}", config.validate_by_ldap);
        println!("  Database validation: {}", config.validate_by_database);
        process::exit(0);
    }

    init_tracing(config.log_level.as_deref().unwrap_or("info"));
    info!("RADIUS server starting");
    info!("Loaded configuration from: {}", cli.config_path);

    let secrets = match config.secret_table() {
        Ok(table) => {
            if table.is_empty() {
                warn!("No NAS clients configured; every datagram will be dropped");
            }
            Arc::new(table)
        }
        Err(e) => {
            error!("Invalid NAS settings: {}", e);
            process::exit(1);
        }
    };

    let mut server_config = ServerConfig::new(
        config.auth_addr().unwrap_or_else(|e| {
            error!("Invalid bind address: {}", e);
            process::exit(1);
        }),
        config.acct_addr().unwrap_or_else(|e| {
            error!("Invalid bind address: {}", e);
            process::exit(1);
        }),
        secrets,
    );

    if config.validate_by_ldap {
        info!("External authenticator: LDAP at {}", config.ldap.path);
        server_config = server_config
            .with_external_authenticator(Arc::new(LdapAuthenticator::new(config.ldap.clone())));
    }

    if config.validate_by_database {
        info!("Credential store: database");
        match SqlCredentialStore::connect(&config.database).await {
            Ok(store) => {
                server_config = server_config.with_credential_store(Arc::new(store));
            }
            Err(e) => {
                error!("Failed to connect credential store: {}", e);
                process::exit(1);
            }
        }
    } else if !config.users.is_empty() {
        let mut store = MemoryCredentialStore::new();
        for user in &config.users {
            store.add_user(&user.username, &user.password);
        }
        info!("Credential store: {} configured users", store.len());
        server_config = server_config.with_credential_store(Arc::new(store));
    }

    let server = match RadiusServer::bind(server_config).await {
        Ok(server) => server,
        Err(e) => {
            error!("Failed to start server: {}", e);
            process::exit(1);
        }
    };

    info!("Server started; press Ctrl+C to stop");
    if let Err(e) = server.run().await {
        error!("Server error: {}", e);
        process::exit(1);
    }
}

fn init_tracing(level: &str) {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)))
        .with(tracing_subscriber::fmt::layer())
        .init();
}
