use std::io;

use clap::{Args, Subcommand};
use storefront::carts::{Cart, CartItemUuid, CartReceipt};
use storefront_app::context::AppContext;

use super::report;

#[derive(Debug, Args)]
pub(crate) struct CartCommand {
    #[command(subcommand)]
    command: CartSubcommand,
}

#[derive(Debug, Subcommand)]
enum CartSubcommand {
    /// Print the cart
    Show,

    /// Add a product
    Add(AddItemArgs),

    /// Change the quantity of a line; zero removes it
    SetQuantity(SetQuantityArgs),

    /// Remove a line
    Remove(ItemArgs),

    /// Apply a coupon code
    Coupon(CouponArgs),

    /// Remove the applied coupon
    RemoveCoupon,

    /// Remove every line
    Clear,
}

#[derive(Debug, Args)]
struct ItemArgs {
    /// Product slug
    slug: String,

    /// Variant SKU, for products with variants
    #[arg(long)]
    variant: Option<String>,
}

#[derive(Debug, Args)]
struct AddItemArgs {
    #[command(flatten)]
    item: ItemArgs,

    /// Units to add
    #[arg(long, default_value_t = 1)]
    quantity: u32,
}

#[derive(Debug, Args)]
struct SetQuantityArgs {
    #[command(flatten)]
    item: ItemArgs,

    /// New quantity
    quantity: u32,
}

#[derive(Debug, Args)]
struct CouponArgs {
    /// Coupon code, case-insensitive
    code: String,
}

pub(crate) async fn run(ctx: &AppContext, command: CartCommand) -> Result<(), String> {
    let user = ctx.auth.current().map(|user| user.uuid);

    let cart = match command.command {
        CartSubcommand::Show => ctx.carts.get_or_create_cart(user).await,
        CartSubcommand::Add(args) => {
            let product = ctx
                .catalog
                .get_product_by_slug(&args.item.slug)
                .await
                .map_err(|error| report(&error))?;

            let variant = match &args.item.variant {
                Some(sku) => Some(
                    product
                        .variant_by_sku(sku)
                        .map(|variant| variant.uuid)
                        .ok_or_else(|| format!("{} has no variant {sku}", product.name))?,
                ),
                None => None,
            };

            ctx.carts
                .add_item(user, product.uuid, variant, args.quantity)
                .await
        }
        CartSubcommand::SetQuantity(args) => {
            let cart = ctx
                .carts
                .get_or_create_cart(user)
                .await
                .map_err(|error| report(&error))?;
            let item = find_item(&cart, &args.item)?;

            ctx.carts.update_quantity(user, item, args.quantity).await
        }
        CartSubcommand::Remove(args) => {
            let cart = ctx
                .carts
                .get_or_create_cart(user)
                .await
                .map_err(|error| report(&error))?;
            let item = find_item(&cart, &args)?;

            ctx.carts.remove_item(user, item).await
        }
        CartSubcommand::Coupon(args) => ctx.carts.apply_coupon(user, &args.code).await,
        CartSubcommand::RemoveCoupon => ctx.carts.remove_coupon(user).await,
        CartSubcommand::Clear => ctx.carts.clear(user).await,
    }
    .map_err(|error| report(&error))?;

    print_cart(ctx, &cart)
}

fn print_cart(ctx: &AppContext, cart: &Cart) -> Result<(), String> {
    CartReceipt::new(cart, &ctx.policy)
        .write_to(io::stdout())
        .map_err(|error| report(&error))
}

fn find_item(cart: &Cart, args: &ItemArgs) -> Result<CartItemUuid, String> {
    let mut matches = cart.items.iter().filter(|item| {
        item.product.slug == args.slug
            && args.variant.as_ref().is_none_or(|sku| {
                item.variant
                    .as_ref()
                    .is_some_and(|variant| variant.sku.eq_ignore_ascii_case(sku))
            })
    });

    match (matches.next(), matches.next()) {
        (Some(item), None) => Ok(item.uuid),
        (Some(_), Some(_)) => Err(format!(
            "{} is in the cart more than once; pass --variant",
            args.slug
        )),
        (None, _) => Err(format!("{} is not in the cart", args.slug)),
    }
}
