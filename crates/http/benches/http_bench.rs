use std::hint::black_box;

use bytes::BytesMut;
use criterion::{Criterion, criterion_group, criterion_main};
use pulse_http::codec::{RequestDecoder, ResponseEncoder};
use pulse_http::connection::HttpConnection;
use pulse_http::handler::make_handler;
use pulse_http::protocol::{HandlerError, Response};
use pulse_http::router::Router;
use tokio_util::codec::{Decoder, Encoder};

const SERVICES: [&str; 11] =
    ["findseed", "tas8999", "purrify", "qotd", "gameserver01", "proxy", "lobby", "tino", "httpd", "postgresql", "reposilite"];

async fn active(_path: String) -> Result<Response, HandlerError> {
    Ok(Response::ok("1"))
}

fn router() -> Router {
    let mut builder = Router::builder().route("", make_handler(|_path: String| async { Ok(Response::ok("Pong!\r\n")) }));
    for service in SERVICES {
        builder = builder.route(service, make_handler(active));
    }
    builder.build()
}

fn bench_request_decoder(c: &mut Criterion) {
    let request = b"GET /reposilite HTTP/1.1\r\nHost: localhost\r\n\r\n";

    c.bench_function("decode_request_line", |b| {
        b.iter(|| {
            let mut decoder = RequestDecoder::new();
            let mut bytes = BytesMut::from(&request[..]);
            black_box(decoder.decode(&mut bytes).unwrap());
        });
    });
}

fn bench_response_encoder(c: &mut Criterion) {
    let response = Response::ok("Pong!\r\n");

    c.bench_function("encode_response", |b| {
        b.iter(|| {
            let mut encoder = ResponseEncoder::new();
            let mut bytes = BytesMut::new();
            encoder.encode(response.clone(), &mut bytes).unwrap();
            black_box(bytes);
        });
    });
}

fn bench_http_connection(c: &mut Criterion) {
    let request = b"GET /reposilite HTTP/1.1\r\nHost: localhost\r\n\r\n";
    let router = router();
    let runtime = tokio::runtime::Builder::new_current_thread().enable_all().build().unwrap();

    c.bench_function("process_last_endpoint", |b| {
        b.to_async(&runtime).iter(|| async {
            let mut written = Vec::with_capacity(64);
            let connection = HttpConnection::new(&request[..], &mut written);
            black_box(connection.process(&router).await.unwrap());
            black_box(written);
        });
    });
}

criterion_group!(benches, bench_request_decoder, bench_response_encoder, bench_http_connection);
criterion_main!(benches);
