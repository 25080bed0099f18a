mod test_game_loop;
