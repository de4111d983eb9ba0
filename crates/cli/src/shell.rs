//! The interactive shell: command parsing and dispatch.
//!
//! Commands are parsed with clap in multicall mode, so `help` and per-command
//! usage come for free. The shell owns the two stores; every backend failure
//! is rendered as a message and the loop keeps going.

use std::io::{BufRead, Write};
use std::path::PathBuf;

use clap::{Parser, Subcommand};

use livraria_client::services::{
    self, AvatarImage, FileUpload, NewBookForm, RegistrationForm,
};
use livraria_client::{
    AuthError, CartItem, CartStore, CheckoutError, CheckoutOutcome, CheckoutReconciler,
    SessionStore, SupabaseClient,
};
use livraria_core::{BookId, Price, Role, UserId};

#[derive(Parser)]
#[command(name = "livraria", multicall = true, disable_version_flag = true)]
struct Line {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Sign in
    Login { email: String, password: String },
    /// Create an account
    Register {
        #[arg(long)]
        name: String,
        #[arg(long)]
        cpf: String,
        /// DD/MM/YYYY
        #[arg(long)]
        birth_date: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
        #[arg(long)]
        confirm: String,
        /// Path to an avatar image
        #[arg(long)]
        avatar: Option<PathBuf>,
    },
    /// Sign out
    Logout,
    /// Show the signed-in user
    Whoami,
    /// List the catalog, newest first
    Books,
    /// List books matching a genre
    Genre { genre: String },
    /// Put a book in the cart
    Add {
        id: i64,
        /// Suppress the already-in-cart notice
        #[arg(long)]
        silent: bool,
    },
    /// Take a book out of the cart
    Remove { id: i64 },
    /// Show the cart
    Cart,
    /// Buy everything in the cart
    Checkout,
    /// Books you own
    Library,
    /// Purchase history, most recent first
    Orders,
    /// Publish a book (authors only)
    Publish {
        #[arg(long)]
        title: String,
        #[arg(long)]
        genre: Option<String>,
        #[arg(long)]
        publisher: Option<String>,
        #[arg(long)]
        synopsis: Option<String>,
        #[arg(long)]
        year: Option<i32>,
        #[arg(long)]
        pages: Option<i64>,
        /// Price in centavos (1990 = R$ 19,90)
        #[arg(long, default_value_t = 0)]
        price: i64,
        #[arg(long)]
        pdf: PathBuf,
        #[arg(long)]
        cover: Option<PathBuf>,
    },
    /// Show or update your profile
    Profile {
        #[arg(long)]
        name: Option<String>,
        /// Path to a new avatar image
        #[arg(long)]
        avatar: Option<PathBuf>,
    },
    /// Leave the shell
    #[command(alias = "exit")]
    Quit,
}

pub struct Shell {
    client: SupabaseClient,
    session: SessionStore,
    cart: CartStore,
}

impl Shell {
    pub fn new(client: SupabaseClient) -> Self {
        Self {
            client,
            session: SessionStore::new(),
            cart: CartStore::new(),
        }
    }

    pub async fn run(mut self) {
        let stdin = std::io::stdin();
        loop {
            print!("livraria> ");
            let _ = std::io::stdout().flush();

            let mut raw = String::new();
            match stdin.lock().read_line(&mut raw) {
                Ok(0) | Err(_) => break,
                Ok(_) => {}
            }
            let words: Vec<&str> = raw.split_whitespace().collect();
            if words.is_empty() {
                continue;
            }

            match Line::try_parse_from(words.iter().copied()) {
                Ok(line) => {
                    if self.dispatch(line.command).await {
                        break;
                    }
                }
                Err(err) => print!("{err}"),
            }
        }
        println!("Até logo!");
    }

    /// Run one command. Returns true when the shell should exit.
    async fn dispatch(&mut self, command: Command) -> bool {
        match command {
            Command::Login { email, password } => self.login(&email, &password).await,
            Command::Register {
                name,
                cpf,
                birth_date,
                email,
                password,
                confirm,
                avatar,
            } => {
                self.register(RegistrationForm {
                    name,
                    cpf,
                    birth_date,
                    email,
                    password,
                    password_confirmation: confirm,
                    avatar: avatar.and_then(read_image),
                })
                .await;
            }
            Command::Logout => {
                self.session.clear(&self.client).await;
                println!("Sessão encerrada.");
            }
            Command::Whoami => self.whoami(),
            Command::Books => match services::catalog::list_books(&self.client).await {
                Ok(books) => print_books(&books),
                Err(err) => println!("Não foi possível carregar o catálogo: {err}"),
            },
            Command::Genre { genre } => {
                match services::catalog::books_by_genre(&self.client, &genre).await {
                    Ok(books) if books.is_empty() => {
                        println!("Nenhum livro no gênero \"{genre}\".");
                    }
                    Ok(books) => print_books(&books),
                    Err(err) => println!("Não foi possível buscar por gênero: {err}"),
                }
            }
            Command::Add { id, silent } => self.add(BookId::new(id), silent).await,
            Command::Remove { id } => {
                self.cart.remove(BookId::new(id));
                println!("Removido. {} item(ns) no carrinho.", self.cart.len());
            }
            Command::Cart => self.show_cart(),
            Command::Checkout => self.checkout().await,
            Command::Library => self.library(false).await,
            Command::Orders => self.library(true).await,
            Command::Publish {
                title,
                genre,
                publisher,
                synopsis,
                year,
                pages,
                price,
                pdf,
                cover,
            } => {
                self.publish(title, genre, publisher, synopsis, year, pages, price, pdf, cover)
                    .await;
            }
            Command::Profile { name, avatar } => self.profile(name, avatar).await,
            Command::Quit => return true,
        }
        false
    }

    async fn login(&mut self, email: &str, password: &str) {
        match self.session.authenticate(&self.client, email, password).await {
            Ok(user) => println!("Bem-vindo(a), {}!", user.name),
            Err(AuthError::InvalidEmail(err)) => println!("E-mail inválido: {err}"),
            Err(AuthError::Rejected(msg)) => println!("{msg}"),
            Err(AuthError::Gateway(err)) => {
                println!("Falha de conexão, tente novamente: {err}");
            }
        }
    }

    async fn register(&mut self, form: RegistrationForm) {
        match services::register(&self.client, form).await {
            Ok(user) => {
                println!("Conta criada. Bem-vindo(a), {}!", user.name);
                self.session.set_direct(user);
            }
            Err(err) => println!("Cadastro não realizado: {err}"),
        }
    }

    fn whoami(&self) {
        match self.session.current() {
            Some(user) => {
                println!(
                    "{} <{}> — {} ({}, {}%)",
                    user.name,
                    user.email,
                    user.role,
                    user.tier.label(),
                    user.progress.percent()
                );
            }
            None => println!("Ninguém está logado."),
        }
    }

    async fn add(&mut self, id: BookId, silent: bool) {
        match services::catalog::get_book(&self.client, id).await {
            Ok(book) => {
                if self.cart.add(CartItem::from_book(&book)) {
                    println!("\"{}\" adicionado ao carrinho.", book.title);
                } else if !silent {
                    println!("\"{}\" já está no carrinho.", book.title);
                }
            }
            Err(err) => println!("Livro não encontrado: {err}"),
        }
    }

    fn show_cart(&self) {
        if self.cart.is_empty() {
            println!("Carrinho vazio.");
            return;
        }
        for item in self.cart.items() {
            println!("  [{}] {} — {} — {}", item.id, item.title, item.author, item.price);
        }
        println!("Total: {}", self.cart.total());
    }

    async fn checkout(&mut self) {
        let Some(user_id) = self.current_user_id() else {
            return;
        };

        let reconciler = CheckoutReconciler::new(&self.client);
        match reconciler.checkout(user_id, &mut self.cart).await {
            Ok(CheckoutOutcome::NothingToBuy) => println!("Carrinho vazio."),
            Ok(CheckoutOutcome::AlreadyOwned { skipped }) => {
                println!("Você já possui todos os {skipped} item(ns); nada foi comprado.");
            }
            Ok(CheckoutOutcome::Purchased {
                newly_added,
                already_owned,
            }) => {
                println!("Compra concluída: {} livro(s) novo(s).", newly_added.len());
                if already_owned > 0 {
                    println!("{already_owned} item(ns) já eram seus e foram pulados.");
                }
            }
            Err(CheckoutError::Gateway(err)) => {
                println!("A compra falhou e o carrinho foi mantido: {err}");
            }
        }
    }

    async fn library(&self, as_orders: bool) {
        let Some(user_id) = self.current_user_id() else {
            return;
        };

        let result = if as_orders {
            services::catalog::my_orders(&self.client, user_id).await
        } else {
            services::catalog::my_library(&self.client, user_id).await
        };
        match result {
            Ok(orders) if orders.is_empty() => println!("Sua biblioteca está vazia."),
            Ok(orders) => {
                for order in orders {
                    let when = order
                        .purchased_at
                        .map_or_else(|| "-".to_string(), |t| t.format("%d/%m/%Y").to_string());
                    println!("  [{}] {} — {} ({})", order.book.id, order.book.title, order.book.author, when);
                }
            }
            Err(err) => println!("Não foi possível carregar sua biblioteca: {err}"),
        }
    }

    #[allow(clippy::too_many_arguments)]
    async fn publish(
        &self,
        title: String,
        genre: Option<String>,
        publisher: Option<String>,
        synopsis: Option<String>,
        year: Option<i32>,
        pages: Option<i64>,
        price: i64,
        pdf: PathBuf,
        cover: Option<PathBuf>,
    ) {
        let Some(user) = self.session.current() else {
            println!("Faça login primeiro.");
            return;
        };
        if user.role != Role::Author && user.role != Role::Admin {
            println!("Apenas autores podem publicar.");
            return;
        }

        let Ok(price) = Price::from_centavos(price) else {
            println!("Preço inválido.");
            return;
        };
        let Some(pdf) = read_file(pdf) else {
            return;
        };
        let cover = cover.and_then(read_file);

        let form = NewBookForm {
            title,
            author_name: user.name.clone(),
            genre,
            publisher,
            synopsis,
            year,
            pages,
            price,
            cover,
            pdf,
        };
        match services::publish_book(&self.client, user.id, form).await {
            Ok(()) => println!("Livro publicado!"),
            Err(err) => println!("Publicação não realizada: {err}"),
        }
    }

    async fn profile(&mut self, name: Option<String>, avatar: Option<PathBuf>) {
        let Some(user) = self.session.current() else {
            println!("Ninguém está logado.");
            return;
        };
        if name.is_none() && avatar.is_none() {
            self.whoami();
            return;
        }
        let user_id = user.id;

        let mut patch = livraria_client::models::UserPatch::default();

        if let Some(image) = avatar.and_then(read_image) {
            match services::upload_avatar(&self.client, user_id, image.bytes, &image.source_path)
                .await
            {
                Ok(url) => {
                    patch.avatar = Some(livraria_client::models::Avatar::Remote(url));
                }
                Err(err) => println!("O envio do avatar falhou: {err}"),
            }
        }
        if let Some(new_name) = name {
            let result = self
                .client
                .update(
                    "usuarios",
                    "id",
                    &user_id.to_string(),
                    &serde_json::json!({ "nome": new_name.clone() }),
                )
                .await;
            match result {
                Ok(()) => patch.name = Some(new_name),
                Err(err) => println!("Não foi possível salvar o nome: {err}"),
            }
        }

        if patch.is_empty() {
            return;
        }
        self.session.update(patch);
        println!("Perfil atualizado.");
    }

    fn current_user_id(&self) -> Option<UserId> {
        match self.session.current() {
            Some(user) => Some(user.id),
            None => {
                println!("Faça login primeiro.");
                None
            }
        }
    }
}

fn print_books(books: &[livraria_client::models::Book]) {
    for book in books {
        let price = if book.price.is_free() {
            "grátis".to_string()
        } else {
            book.price.to_string()
        };
        println!(
            "  [{}] {} — {} — {}{}",
            book.id,
            book.title,
            book.author,
            price,
            book.genre.as_deref().map_or_else(String::new, |g| format!(" ({g})")),
        );
    }
}

/// Read a picked image from disk; failures are reported and swallowed so an
/// avatar never blocks the flow it decorates.
fn read_image(path: PathBuf) -> Option<AvatarImage> {
    match std::fs::read(&path) {
        Ok(bytes) => Some(AvatarImage {
            source_path: path,
            bytes,
        }),
        Err(err) => {
            println!("Não foi possível ler {}: {err}", path.display());
            None
        }
    }
}

fn read_file(path: PathBuf) -> Option<FileUpload> {
    match std::fs::read(&path) {
        Ok(bytes) => Some(FileUpload {
            source_path: path,
            bytes,
        }),
        Err(err) => {
            println!("Não foi possível ler {}: {err}", path.display());
            None
        }
    }
}
