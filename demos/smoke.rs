use apiprobe_http::{
    schema::{self, Pokemon},
    ApiClient, LastAttempt, RequestOptions,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let last = LastAttempt::new();
    let api = ApiClient::from_env().with_observer(last.clone());

    let res = api
        .request("/pokemon/ditto", RequestOptions::new().retries(2))
        .await?;
    println!("{} {} after {} attempt(s)", res.status(), res.url(), res.attempts());

    if res.status() != 200 {
        println!("last attempt: {:?}", last.get());
        return Ok(());
    }

    let ditto: Pokemon = schema::parse(res.json_value().await?)?;
    println!("#{} {} ({} abilities)", ditto.id, ditto.name, ditto.abilities.len());

    Ok(())
}
