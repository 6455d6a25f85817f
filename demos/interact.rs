//! Walks a deployed sale through its three stages and buys one whole unit in each.
//!
//! Reads `RPC_URL`, `PRIV_KEY_PATH` and `STAGED_SALE_ADDRESS` from the environment
//! or a `.env` file. The signing key must belong to the sale administrator and
//! must not be the sale beneficiary, otherwise gas muddies the balance check.

use std::{str::FromStr, sync::Arc};

use ethers::{
    middleware::SignerMiddleware,
    prelude::abigen,
    providers::{Http, Middleware, Provider},
    signers::{LocalWallet, Signer},
    types::{Address, U256},
    utils::parse_ether,
};
use eyre::{ensure, WrapErr};

abigen!(
    StagedTokenSale,
    r#"[
        function setStage(uint8 stage) external
        function setFinalRate(uint256 rate) external
        function purchase(address beneficiary) external payable returns (uint256)
        function quote(uint256 payment) external view returns (uint256)
        function getPrice() external view returns (uint256)
        function stage() external view returns (uint8)
        function raisedTotal() external view returns (uint256)
        function finalSaleRate() external view returns (uint256)
        function beneficiary() external view returns (address)
        function tokensAvailable() external view returns (uint256)
        function balanceOf(address account) external view returns (uint256)
    ]"#
);

const FINAL_SALE_RATE: u64 = 50_000_000_000_000_000;

#[tokio::main]
async fn main() -> eyre::Result<()> {
    dotenv::dotenv().ok();
    let rpc_url = std::env::var("RPC_URL").wrap_err("No RPC_URL env var set")?;
    let priv_key_path = std::env::var("PRIV_KEY_PATH").wrap_err("No PRIV_KEY_PATH env var set")?;
    let sale_address = std::env::var("STAGED_SALE_ADDRESS").wrap_err("No STAGED_SALE_ADDRESS env var set")?;

    let provider = Provider::<Http>::try_from(rpc_url)?;
    let address: Address = sale_address.parse()?;

    let privkey = std::fs::read_to_string(priv_key_path)?;
    let wallet = LocalWallet::from_str(privkey.trim())?;
    let chain_id = provider.get_chainid().await?.as_u64();
    let buyer = wallet.address();
    let client = Arc::new(SignerMiddleware::new(
        provider,
        wallet.with_chain_id(chain_id),
    ));

    let sale = StagedTokenSale::new(address, client.clone());
    let beneficiary = sale.beneficiary().call().await?;
    let deposit = parse_ether(1)?;

    if sale.final_sale_rate().call().await?.is_zero() {
        sale.set_final_rate(U256::from(FINAL_SALE_RATE)).send().await?.await?;
        println!("final sale rate set to {FINAL_SALE_RATE}");
    }

    for stage in 0u8..3 {
        sale.set_stage(stage).send().await?.await?;
        ensure!(sale.stage().call().await? == stage, "stage {stage} was not applied");

        let price = sale.get_price().call().await?;
        let expected = sale.quote(deposit).call().await?;
        let tokens_before = sale.balance_of(buyer).call().await?;
        let funds_before = client.get_balance(beneficiary, None).await?;
        let raised_before = sale.raised_total().call().await?;

        let receipt = sale
            .purchase(buyer)
            .value(deposit)
            .send()
            .await?
            .await?
            .ok_or_else(|| eyre::eyre!("purchase in stage {stage} was dropped"))?;

        let issued = sale.balance_of(buyer).call().await? - tokens_before;
        let forwarded = client.get_balance(beneficiary, None).await? - funds_before;
        let raised = sale.raised_total().call().await? - raised_before;

        println!(
            "stage {stage}: tx 0x{} price {price} issued {issued} (quoted {expected})",
            hex::encode(receipt.transaction_hash.as_bytes())
        );
        // the quote and the purchase can straddle a feed update
        if issued != expected {
            println!("  price moved between quote and purchase");
        }
        ensure!(forwarded == deposit, "beneficiary received {forwarded}, expected {deposit}");
        ensure!(raised == deposit, "raised total grew by {raised}, expected {deposit}");
    }

    println!(
        "raised {} wei, {} tokens left for sale",
        sale.raised_total().call().await?,
        sale.tokens_available().call().await?
    );
    Ok(())
}
