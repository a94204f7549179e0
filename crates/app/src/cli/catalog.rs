use clap::{Args, Subcommand};
use rust_decimal::Decimal;
use storefront::{money::format_price, products::Product};
use storefront_app::{
    context::AppContext,
    domain::catalog::{ProductQuery, ProductSort},
};
use tabled::{builder::Builder, settings::Style};
use tracing::warn;

use super::report;

#[derive(Debug, Args)]
pub(crate) struct CatalogCommand {
    #[command(subcommand)]
    command: CatalogSubcommand,
}

#[derive(Debug, Subcommand)]
enum CatalogSubcommand {
    /// List products
    List(ListProductsArgs),

    /// Show one product with its variants
    Show(ShowProductArgs),

    /// List categories
    Categories,

    /// Toggle a product as favorite
    Favorite(ShowProductArgs),

    /// Recently viewed products, most recent first
    Recent(RecentArgs),
}

#[derive(Debug, Args)]
struct ListProductsArgs {
    /// Category slug
    #[arg(long)]
    category: Option<String>,

    /// Text to search for
    #[arg(long)]
    search: Option<String>,

    /// featured, price-asc, price-desc, name, newest or top-rated
    #[arg(long, default_value_t = ProductSort::Featured)]
    sort: ProductSort,

    /// Lowest price
    #[arg(long)]
    min_price: Option<Decimal>,

    /// Highest price
    #[arg(long)]
    max_price: Option<Decimal>,

    /// Hide products without stock
    #[arg(long)]
    in_stock: bool,

    /// Page number
    #[arg(long, default_value_t = 1)]
    page: usize,
}

#[derive(Debug, Args)]
struct ShowProductArgs {
    /// Product slug
    slug: String,
}

#[derive(Debug, Args)]
struct RecentArgs {
    /// Forget the recently viewed products
    #[arg(long)]
    clear: bool,
}

pub(crate) async fn run(ctx: &AppContext, command: CatalogCommand) -> Result<(), String> {
    match command.command {
        CatalogSubcommand::List(args) => list(ctx, args).await,
        CatalogSubcommand::Show(args) => show(ctx, &args.slug).await,
        CatalogSubcommand::Categories => categories(ctx).await,
        CatalogSubcommand::Favorite(args) => favorite(ctx, &args.slug).await,
        CatalogSubcommand::Recent(args) => recent(ctx, args).await,
    }
}

async fn list(ctx: &AppContext, args: ListProductsArgs) -> Result<(), String> {
    let page = ctx
        .catalog
        .list_products(ProductQuery {
            category: args.category,
            search: args.search,
            min_price: args.min_price,
            max_price: args.max_price,
            in_stock_only: args.in_stock,
            sort: args.sort,
            page: args.page,
            ..ProductQuery::default()
        })
        .await
        .map_err(|error| report(&error))?;

    if page.products.is_empty() {
        println!("no products found");
        return Ok(());
    }

    let favorites = ctx.favorites.list().unwrap_or_else(|error| {
        warn!(%error, "could not read favorites");
        Vec::new()
    });

    let mut builder = Builder::default();
    builder.push_record(["", "Product", "Slug", "Category", "Price", "Stock", "Rating"]);

    for product in &page.products {
        builder.push_record([
            if favorites.contains(&product.uuid) { "*" } else { "" }.to_string(),
            product.name.clone(),
            product.slug.clone(),
            product.category.clone(),
            price(ctx, product.price)?,
            product.total_stock().to_string(),
            format!("{} ({})", product.rating.average, product.rating.count),
        ]);
    }

    let mut table = builder.build();
    table.with(Style::rounded());

    println!("{table}");
    println!(
        "page {} of {} ({} products)",
        page.page,
        page.total_pages(),
        page.total
    );

    Ok(())
}

async fn show(ctx: &AppContext, slug: &str) -> Result<(), String> {
    let product = ctx
        .catalog
        .get_product_by_slug(slug)
        .await
        .map_err(|error| report(&error))?;

    if let Err(error) = ctx.recently_viewed.record(product.uuid) {
        warn!(%error, "could not record recently viewed product");
    }

    println!("{}", product.name);

    if let Some(brand) = &product.brand {
        println!("brand: {brand}");
    }

    println!("category: {}", product.category);
    println!("price: {}", price(ctx, product.price)?);

    if let Some(compare_at) = product.compare_at_price {
        println!("was: {}", price(ctx, compare_at)?);
    }

    println!(
        "rating: {} from {} reviews",
        product.rating.average, product.rating.count
    );
    println!();
    println!("{}", product.description);

    if !product.variants.is_empty() {
        println!("\n{}", variants_table(ctx, &product)?);
    }

    Ok(())
}

fn variants_table(ctx: &AppContext, product: &Product) -> Result<String, String> {
    let mut builder = Builder::default();
    builder.push_record(["SKU", "Variant", "Price", "Stock"]);

    for variant in &product.variants {
        builder.push_record([
            variant.sku.clone(),
            variant.name.clone(),
            price(ctx, product.effective_price(Some(variant)))?,
            variant.stock.to_string(),
        ]);
    }

    let mut table = builder.build();
    table.with(Style::rounded());

    Ok(table.to_string())
}

async fn categories(ctx: &AppContext) -> Result<(), String> {
    let categories = ctx
        .catalog
        .categories()
        .await
        .map_err(|error| report(&error))?;

    for category in categories {
        println!("{} ({})", category.slug, category.product_count);
    }

    Ok(())
}

async fn favorite(ctx: &AppContext, slug: &str) -> Result<(), String> {
    let product = ctx
        .catalog
        .get_product_by_slug(slug)
        .await
        .map_err(|error| report(&error))?;

    let added = ctx
        .favorites
        .toggle(product.uuid)
        .map_err(|error| report(&error))?;

    if added {
        println!("added {} to favorites", product.name);
    } else {
        println!("removed {} from favorites", product.name);
    }

    Ok(())
}

async fn recent(ctx: &AppContext, args: RecentArgs) -> Result<(), String> {
    if args.clear {
        return ctx
            .recently_viewed
            .clear()
            .map_err(|error| report(&error));
    }

    let viewed = ctx
        .recently_viewed
        .list()
        .map_err(|error| report(&error))?;

    for uuid in viewed {
        // Products delisted since they were viewed are skipped.
        if let Ok(product) = ctx.catalog.get_product(uuid).await {
            println!("{} ({})", product.name, product.slug);
        }
    }

    Ok(())
}

fn price(ctx: &AppContext, amount: Decimal) -> Result<String, String> {
    format_price(amount, &ctx.policy.currency).map_err(|error| report(&error))
}
