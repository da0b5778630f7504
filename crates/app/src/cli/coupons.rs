use clap::Args;
use jiff::Timestamp;
use promo_engine::context::CustomerId;

use super::SourceArgs;

#[derive(Debug, Args)]
pub(crate) struct CouponsArgs {
    #[command(flatten)]
    source: SourceArgs,

    /// Customer to list coupons for
    #[arg(long)]
    customer_id: String,

    /// List guest coupons
    #[arg(long)]
    guest: bool,

    /// Evaluation instant; defaults to now
    #[arg(long)]
    at: Option<Timestamp>,
}

pub(crate) async fn run(args: CouponsArgs) -> Result<(), String> {
    let ctx = args.source.context().await?;

    let coupons = ctx
        .promotions
        .list_coupons(
            Some(CustomerId::new(args.customer_id)),
            args.guest,
            args.at.unwrap_or_else(Timestamp::now),
        )
        .await;

    if coupons.is_empty() {
        println!("no coupons");

        return Ok(());
    }

    for coupon in coupons {
        let available = coupon
            .available_count
            .map_or_else(|| "unlimited".to_string(), |count| count.to_string());

        println!("{}\t{}\t{available}", coupon.promo_code, coupon.promo_id);
    }

    Ok(())
}
