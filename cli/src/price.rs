use std::collections::HashMap;

use anyhow::anyhow;

const PRICE_API_URL: &str = "https://api.coingecko.com/api/v3/simple/price";
const TON_COIN_ID: &str = "the-open-network";

type PriceResponse = HashMap<String, HashMap<String, f64>>;

/// Fetches the TON price in `currency` (e.g. "usd") from the public price feed.
pub async fn fetch_ton_price(client: &reqwest::Client, currency: &str) -> anyhow::Result<f64> {
    let currency = currency.to_lowercase();
    let response: PriceResponse = client
        .get(PRICE_API_URL)
        .query(&[("ids", TON_COIN_ID), ("vs_currencies", currency.as_str())])
        .send()
        .await?
        .error_for_status()?
        .json()
        .await?;
    ton_price(&response, &currency).ok_or_else(|| anyhow!("No {} price for TON", currency))
}

fn ton_price(response: &PriceResponse, currency: &str) -> Option<f64> {
    response.get(TON_COIN_ID)?.get(currency).copied()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ton_price() {
        let response: PriceResponse =
            serde_json::from_str(r#"{ "the-open-network": { "usd": 5.42 } }"#).unwrap();
        assert_eq!(ton_price(&response, "usd"), Some(5.42));
        assert_eq!(ton_price(&response, "eur"), None);
        assert_eq!(ton_price(&PriceResponse::new(), "usd"), None);
    }
}
